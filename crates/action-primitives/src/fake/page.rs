use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use super::frame::FakeFrame;
use super::{Journal, POLL_INTERVAL};
use crate::driver::{Frame, FrameRef, Page};
use crate::errors::DriverError;
use crate::types::{NavigationOptions, NetworkConditions, Viewport};
use crate::waiting::bounded;

/// In-memory page.
///
/// Navigations complete immediately and are broadcast to every armed
/// navigation listener.
pub struct FakePage {
    id: String,
    url: Mutex<String>,
    journal: Journal,
    permissive: bool,
    main: Arc<FakeFrame>,
    attached: Mutex<Vec<(Arc<FakeFrame>, Instant)>>,
    viewport: Mutex<Option<Viewport>>,
    network: Mutex<Option<NetworkConditions>>,
    default_timeout: Mutex<Option<Duration>>,
    navigation_error: Mutex<Option<DriverError>>,
    closed: AtomicBool,
    navigations: broadcast::Sender<String>,
}

impl FakePage {
    pub(crate) fn new(url: &str, journal: Journal, permissive: bool) -> Arc<Self> {
        let (navigations, _) = broadcast::channel(16);
        Arc::new(Self {
            id: url.to_string(),
            url: Mutex::new(url.to_string()),
            main: FakeFrame::new(url, "", false, journal.clone(), permissive),
            journal,
            permissive,
            attached: Mutex::new(Vec::new()),
            viewport: Mutex::new(None),
            network: Mutex::new(None),
            default_timeout: Mutex::new(None),
            navigation_error: Mutex::new(None),
            closed: AtomicBool::new(false),
            navigations,
        })
    }

    /// Main frame as its concrete type
    pub fn main(&self) -> Arc<FakeFrame> {
        self.main.clone()
    }

    /// Attach an out-of-process frame (site-isolated iframe)
    pub fn attach_out_of_process_frame(&self, url: &str) -> Arc<FakeFrame> {
        self.attach_out_of_process_frame_after(url, Duration::ZERO)
    }

    pub fn attach_out_of_process_frame_after(&self, url: &str, delay: Duration) -> Arc<FakeFrame> {
        let frame = FakeFrame::new(url, "", true, self.journal.clone(), self.permissive);
        self.attached
            .lock()
            .push((frame.clone(), Instant::now() + delay));
        frame
    }

    pub fn current_url(&self) -> String {
        self.url.lock().clone()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        *self.viewport.lock()
    }

    pub fn network_conditions(&self) -> Option<NetworkConditions> {
        *self.network.lock()
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        *self.default_timeout.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Make subsequent navigations fail with `error`
    pub fn fail_navigation(&self, error: DriverError) {
        *self.navigation_error.lock() = Some(error);
    }

    fn record(&self, action: impl std::fmt::Display) {
        self.journal.record(format!("page({}) {}", self.id, action));
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.is_closed() {
            return Err(DriverError::TargetClosed(format!("page {} is closed", self.id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Page for FakePage {
    fn url(&self) -> String {
        self.current_url()
    }

    fn main_frame(&self) -> FrameRef {
        self.main.clone()
    }

    fn frames(&self) -> Vec<FrameRef> {
        let now = Instant::now();
        let mut frames: Vec<FrameRef> = vec![self.main.clone() as FrameRef];
        frames.extend(
            self.attached
                .lock()
                .iter()
                .filter(|(_, ready_at)| *ready_at <= now)
                .map(|(frame, _)| frame.clone() as FrameRef),
        );
        frames
    }

    async fn wait_for_frame(
        &self,
        url_or_name: &str,
        timeout: Duration,
    ) -> Result<FrameRef, DriverError> {
        self.record(format_args!("wait_for_frame {}", url_or_name));
        let found = bounded(timeout, async {
            loop {
                let frame = self
                    .frames()
                    .into_iter()
                    .find(|frame| frame.url() == url_or_name || frame.name() == url_or_name);
                if let Some(frame) = frame {
                    return frame;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        found.ok_or_else(|| {
            DriverError::timed_out(format!("waiting for frame '{}'", url_or_name), timeout)
        })
    }

    fn set_default_timeout(&self, timeout: Duration) {
        self.record(format_args!("set_default_timeout {}ms", timeout.as_millis()));
        *self.default_timeout.lock() = Some(timeout);
    }

    async fn set_viewport(&self, viewport: &Viewport) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.record(format_args!(
            "set_viewport {}x{}",
            viewport.width, viewport.height
        ));
        *self.viewport.lock() = Some(*viewport);
        Ok(())
    }

    async fn emulate_network_conditions(
        &self,
        conditions: &NetworkConditions,
    ) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.record(format_args!(
            "emulate_network_conditions latency={}",
            conditions.latency
        ));
        *self.network.lock() = Some(*conditions);
        Ok(())
    }

    async fn navigate(&self, url: &str, _options: &NavigationOptions) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.record(format_args!("navigate {}", url));
        if let Some(error) = self.navigation_error.lock().clone() {
            return Err(error);
        }
        *self.url.lock() = url.to_string();
        self.main.set_url(url);
        // No receivers is fine: nobody armed a listener
        let _ = self.navigations.send(url.to_string());
        Ok(())
    }

    fn wait_for_navigation(
        &self,
        options: NavigationOptions,
    ) -> BoxFuture<'static, Result<(), DriverError>> {
        self.record("wait_for_navigation armed");
        let mut receiver = self.navigations.subscribe();
        Box::pin(async move {
            match bounded(options.timeout, receiver.recv()).await {
                Some(Ok(_)) | Some(Err(broadcast::error::RecvError::Lagged(_))) => Ok(()),
                Some(Err(broadcast::error::RecvError::Closed)) => {
                    Err(DriverError::TargetClosed("page closed while awaiting navigation".into()))
                }
                None => Err(DriverError::timed_out("waiting for navigation", options.timeout)),
            }
        })
    }

    async fn key_down(&self, key: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.record(format_args!("key_down {}", key));
        Ok(())
    }

    async fn key_up(&self, key: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.record(format_args!("key_up {}", key));
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.record("close");
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
