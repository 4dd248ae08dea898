//! Timer-driven service that runs a tracker against an editor host.

use std::ops::ControlFlow;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::{SortOrder, TrackerConfig};
use crate::error::{Result, TrackerError};
use crate::host::EditorHost;
use crate::store::DocumentId;
use crate::tracker::PositionTracker;

/// Messages the host delivers between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    /// A document's text changed.
    DocumentChanged(DocumentId),

    /// Re-render the cluster list now.
    Refresh,

    /// Forget all tracked positions.
    Reset,

    /// Drop the records behind one rendered item.
    DeleteCluster {
        document: DocumentId,
        lines: Vec<usize>,
    },

    /// Reveal a location in the editor.
    Select { document: DocumentId, line: usize },

    /// The auto-refresh setting changed.
    SetAutoRefresh(bool),

    /// The list ordering changed.
    SetSortOrder(SortOrder),

    /// Stop ticking and return the tracker.
    Shutdown,
}

/// Sends messages to a running [`TrackerService`].
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    tx: mpsc::Sender<HostMessage>,
}

impl TrackerHandle {
    pub async fn send(&self, message: HostMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| TrackerError::ChannelClosed)
    }

    pub async fn document_changed(&self, document: impl Into<DocumentId>) -> Result<()> {
        let message = HostMessage::DocumentChanged(document.into());
        self.send(message).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.send(HostMessage::Refresh).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(HostMessage::Reset).await
    }

    pub async fn delete_cluster(&self, document: DocumentId, lines: Vec<usize>) -> Result<()> {
        let message = HostMessage::DeleteCluster { document, lines };
        self.send(message).await
    }

    pub async fn select(&self, document: DocumentId, line: usize) -> Result<()> {
        self.send(HostMessage::Select { document, line }).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(HostMessage::Shutdown).await
    }
}

/// Runs ticks and host messages on one task, one at a time.
pub struct TrackerService<H> {
    tracker: PositionTracker,
    host: H,
    rx: mpsc::Receiver<HostMessage>,
}

impl<H: EditorHost> TrackerService<H> {
    /// Create a service and the handle used to talk to it.
    pub fn new(config: TrackerConfig, host: H) -> Result<(Self, TrackerHandle)> {
        let tracker = PositionTracker::new(config)?;
        let (tx, rx) = mpsc::channel(256);
        Ok((Self { tracker, host, rx }, TrackerHandle { tx }))
    }

    /// Tick until shut down or until every handle is dropped.
    pub async fn run(mut self) -> PositionTracker {
        let mut ticker = tokio::time::interval(self.tracker.config().tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Position tracker started (interval: {:?})",
            self.tracker.config().tick_interval()
        );

        loop {
            tokio::select! {
                biased;

                message = self.rx.recv() => {
                    let Some(message) = message else { break };
                    if self.handle(message).is_break() {
                        break;
                    }
                }
                _ = ticker.tick() => self.tick(),
            }
        }

        info!("Position tracker stopped");
        self.tracker
    }

    fn tick(&mut self) {
        let report = self.tracker.tick(self.host.focus(), Utc::now());
        if report.refresh_requested {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        let items = self.tracker.view(Utc::now());
        debug!("Rendering {} clusters", items.len());
        self.host.render(&items);
    }

    fn handle(&mut self, message: HostMessage) -> ControlFlow<()> {
        match message {
            HostMessage::DocumentChanged(document) => {
                if self.tracker.on_document_changed(&document) {
                    self.refresh();
                }
            }
            HostMessage::Refresh => self.refresh(),
            HostMessage::Reset => {
                self.tracker.reset();
                self.refresh();
            }
            HostMessage::DeleteCluster { document, lines } => {
                match self.tracker.delete_cluster(&document, &lines) {
                    Ok(_) => self.refresh(),
                    Err(e) => warn!("Failed to delete cluster: {e}"),
                }
            }
            HostMessage::Select { document, line } => {
                if let Err(e) = self.tracker.select(&mut self.host, &document, line) {
                    warn!("Failed to select position: {e}");
                }
            }
            HostMessage::SetAutoRefresh(enabled) => self.tracker.set_auto_refresh(enabled),
            HostMessage::SetSortOrder(order) => {
                self.tracker.set_sort_order(order);
                self.refresh();
            }
            HostMessage::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FocusState;
    use crate::store::Focus;
    use crate::view::ClusterItem;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedHost {
        focus: Option<FocusState>,
        renders: Arc<Mutex<Vec<Vec<ClusterItem>>>>,
        revealed: Arc<Mutex<Vec<(DocumentId, usize)>>>,
    }

    impl EditorHost for SharedHost {
        fn focus(&self) -> Option<Focus<'_>> {
            self.focus.as_ref().map(FocusState::as_focus)
        }

        fn reveal(&mut self, document: &DocumentId, line: usize) {
            let location = (document.clone(), line);
            self.revealed.lock().unwrap().push(location);
        }

        fn render(&mut self, items: &[ClusterItem]) {
            self.renders.lock().unwrap().push(items.to_vec());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dwell_confirms_and_renders() {
        let host = SharedHost {
            focus: Some(FocusState::from_text("src/main.rs", 2, "a\nb\nc\nd")),
            ..SharedHost::default()
        };
        let renders = host.renders.clone();
        let (service, handle) = TrackerService::new(TrackerConfig::default(), host).unwrap();

        let task = tokio::spawn(service.run());
        tokio::time::sleep(Duration::from_millis(7_500)).await;
        handle.shutdown().await.unwrap();
        let tracker = task.await.unwrap();

        let renders = renders.lock().unwrap();
        assert_eq!(renders.len(), 1);
        assert_eq!(renders[0].len(), 1);
        assert_eq!(renders[0][0].file_label, "main.rs");
        assert_eq!(renders[0][0].line_label, "3");
        assert_eq!(tracker.stats().confirmed_lines, 1);
    }

    #[tokio::test]
    async fn test_document_change_respects_auto_refresh() {
        for (auto_refresh, expected) in [(true, 1), (false, 0)] {
            let host = SharedHost::default();
            let renders = host.renders.clone();
            let config = TrackerConfig::new().with_auto_refresh(auto_refresh);
            let (service, handle) = TrackerService::new(config, host).unwrap();

            tokio_test::assert_ok!(handle.document_changed("a.rs").await);
            tokio_test::assert_ok!(handle.shutdown().await);
            service.run().await;

            assert_eq!(renders.lock().unwrap().len(), expected);
        }
    }

    #[tokio::test]
    async fn test_select_and_reset() {
        let host = SharedHost {
            focus: Some(FocusState::from_text("a.rs", 0, "a\nb")),
            ..SharedHost::default()
        };
        let revealed = host.revealed.clone();
        let (mut service, handle) = TrackerService::new(TrackerConfig::default(), host).unwrap();
        service.tick();

        handle.select(DocumentId::from("a.rs"), 1).await.unwrap();
        let untracked = DocumentId::from("other.rs");
        handle.select(untracked, 0).await.unwrap();
        handle.reset().await.unwrap();
        handle.shutdown().await.unwrap();
        let tracker = service.run().await;

        assert_eq!(*revealed.lock().unwrap(), [(DocumentId::from("a.rs"), 1)]);
        assert!(tracker.store().is_empty());
    }

    #[tokio::test]
    async fn test_handle_fails_after_service_dropped() {
        let (service, handle) =
            TrackerService::new(TrackerConfig::default(), SharedHost::default()).unwrap();
        drop(service);

        let err = tokio_test::assert_err!(handle.refresh().await);
        assert!(matches!(err, TrackerError::ChannelClosed));
    }
}
