// =============================================================================
// picker/mock.rs - Plateforme simulée pour les tests
// picker/mock.rs - Simulated platform for tests
// =============================================================================
//
// Chaque ressource simulée passe par le HandleTracker, ce qui permet de
// vérifier qu'aucun handle ne survit à une session.
// Every simulated resource goes through the HandleTracker so tests can check
// that no handle outlives a session.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::common::Color;
use crate::error::{CaptureError, ResourceError};
use crate::geometry::{LogicalPoint, LogicalSize, PixelPoint, PixelRect, ScreenRect};
use crate::handle::{HandleTracker, NativeHandle};
use crate::picker::capture::{check_region, PixelBuffer, ScreenCapturer, Screenshot};
use crate::picker::magnifier::{MagnifiedView, PointerSample};
use crate::picker::overlay::{OverlayEvent, OverlayObserver, OverlaySurface};
use crate::picker::session::HostWindow;

/// Capture dont la couleur vaut (x, y, (x + y) % 2)
/// Screenshot whose color is (x, y, (x + y) % 2)
pub fn synthetic_screenshot(width: u32, height: u32) -> Screenshot {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| Color::new(x as u8, y as u8, ((x + y) % 2) as u8)))
        .collect();
    let buffer = PixelBuffer::new(width, height, pixels).unwrap();
    Screenshot::new(ScreenRect::new(0, 0, width, height), buffer).unwrap()
}

// =============================================================================
// CAPTURE
// =============================================================================

/// Journal partagé des appels, pour vérifier leur ordre
/// Shared call journal, to check call order
pub type Journal = Rc<RefCell<Vec<&'static str>>>;

pub struct MockCapturer {
    tracker: HandleTracker,
    screen: Option<PixelBuffer>,
    release_fails: bool,
    journal: Option<Journal>,
    pub captures: usize,
}

impl MockCapturer {
    pub fn uniform(tracker: &HandleTracker, width: u32, height: u32, color: Color) -> Self {
        Self {
            tracker: tracker.clone(),
            screen: Some(PixelBuffer::filled(width, height, color)),
            release_fails: false,
            journal: None,
            captures: 0,
        }
    }

    /// Display that cannot be read.
    pub fn failing(tracker: &HandleTracker) -> Self {
        Self {
            screen: None,
            ..Self::uniform(tracker, 0, 0, Color::default())
        }
    }

    /// Every handle acquired by a capture fails to release.
    pub fn with_release_failures(mut self) -> Self {
        self.release_fails = true;
        self
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(Rc::clone(journal));
        self
    }

    pub fn with_pixel(mut self, x: u32, y: u32, color: Color) -> Self {
        if let Some(screen) = self.screen.take() {
            let width = screen.width();
            let mut pixels = screen.pixels().to_vec();
            pixels[(y * width + x) as usize] = color;
            self.screen = PixelBuffer::new(width, screen.height(), pixels);
        }
        self
    }
}

fn mock_release(fails: bool, kind: &'static str) -> impl FnOnce(u32) -> Result<(), ResourceError> {
    move |_| {
        if fails {
            Err(ResourceError::Release {
                kind,
                detail: "mock release failure".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl ScreenCapturer for MockCapturer {
    fn virtual_bounds(&self) -> Result<ScreenRect, CaptureError> {
        match &self.screen {
            Some(screen) => Ok(ScreenRect::new(0, 0, screen.width(), screen.height())),
            None => Err(CaptureError::SurfaceUnavailable("mock display locked".into())),
        }
    }

    fn capture_region(&mut self, region: ScreenRect) -> Result<PixelBuffer, CaptureError> {
        check_region(region, self.virtual_bounds()?)?;
        let fails = self.release_fails;
        let device = self.tracker.acquire("device context", 1u32, mock_release(fails, "device context"));
        let bitmap = self.tracker.acquire("bitmap", 2u32, mock_release(fails, "bitmap"));
        self.captures += 1;
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push("capture");
        }
        let screen = self.screen.as_ref().ok_or(CaptureError::EmptyRegion)?;
        let rect = PixelRect::new(region.x as u32, region.y as u32, region.width, region.height);
        let pixels = screen.crop(rect).ok_or(CaptureError::EmptyRegion)?;
        bitmap.release_or_log();
        device.release_or_log();
        Ok(pixels)
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// État partagé entre la surface simulée et le test
/// State shared between the simulated surface and the test
#[derive(Debug, Default)]
pub struct MockLog {
    pub shows: usize,
    pub closes: usize,
    pub crosshairs: Vec<LogicalPoint>,
    pub magnifier_shows: usize,
    pub magnifier_hides: usize,
    pub pointer: Option<PointerSample>,
    pub fail_show: bool,
    pub fail_magnifier: bool,
    /// `Some(event)` is delivered, `None` is a timeout. Once empty the
    /// surface reports `Closed` unless `idle_forever` is set.
    pub script: VecDeque<Option<OverlayEvent>>,
    pub idle_forever: bool,
}

pub struct MockSurface {
    tracker: HandleTracker,
    logical: LogicalSize,
    log: Rc<RefCell<MockLog>>,
    window: Option<NativeHandle<u32>>,
    magnifier: Option<NativeHandle<u32>>,
}

impl MockSurface {
    pub fn new(tracker: &HandleTracker, logical: LogicalSize) -> Self {
        Self {
            tracker: tracker.clone(),
            logical,
            log: Rc::new(RefCell::new(MockLog::default())),
            window: None,
            magnifier: None,
        }
    }

    pub fn log(&self) -> Rc<RefCell<MockLog>> {
        Rc::clone(&self.log)
    }

    fn release_magnifier(&mut self) -> Result<(), ResourceError> {
        match self.magnifier.take() {
            Some(handle) => handle.release(),
            None => Ok(()),
        }
    }
}

impl OverlaySurface for MockSurface {
    fn show(&mut self, _screenshot: &Screenshot) -> Result<(), ResourceError> {
        let mut log = self.log.borrow_mut();
        log.shows += 1;
        if log.fail_show {
            return Err(ResourceError::Acquire { kind: "overlay window" });
        }
        self.window = Some(self.tracker.acquire("overlay window", 10u32, |_| Ok(())));
        Ok(())
    }

    fn logical_size(&self) -> LogicalSize {
        self.logical
    }

    fn pointer(&self) -> Option<PointerSample> {
        self.log.borrow().pointer
    }

    fn wait_event(&mut self, timeout: Duration) -> Option<OverlayEvent> {
        let next = self.log.borrow_mut().script.pop_front();
        match next {
            Some(step) => step,
            None if self.log.borrow().idle_forever => {
                std::thread::sleep(timeout);
                None
            }
            None => Some(OverlayEvent::Closed),
        }
    }

    fn draw_crosshair(&mut self, at: LogicalPoint) {
        self.log.borrow_mut().crosshairs.push(at);
    }

    fn show_magnifier(&mut self, _view: &MagnifiedView) -> Result<(), ResourceError> {
        if self.log.borrow().fail_magnifier {
            return Err(ResourceError::Acquire { kind: "magnifier bitmap" });
        }
        let next = self.tracker.acquire("magnifier bitmap", 20u32, |_| Ok(()));
        self.release_magnifier()?;
        self.magnifier = Some(next);
        self.log.borrow_mut().magnifier_shows += 1;
        Ok(())
    }

    fn hide_magnifier(&mut self) {
        let _ = self.release_magnifier();
        self.log.borrow_mut().magnifier_hides += 1;
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        self.release_magnifier()?;
        if let Some(window) = self.window.take() {
            window.release()?;
        }
        self.log.borrow_mut().closes += 1;
        Ok(())
    }
}

// =============================================================================
// HÔTE ET OBSERVATEUR
// HOST AND OBSERVER
// =============================================================================

#[derive(Debug, Default)]
pub struct MockHost {
    pub calls: Vec<&'static str>,
    pub failures: Vec<String>,
    journal: Option<Journal>,
}

impl MockHost {
    pub fn with_journal(journal: &Journal) -> Self {
        Self {
            journal: Some(Rc::clone(journal)),
            ..Self::default()
        }
    }

    fn record(&mut self, call: &'static str) {
        self.calls.push(call);
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(call);
        }
    }
}

impl HostWindow for MockHost {
    fn minimize(&mut self) {
        self.record("minimize");
    }

    fn restore(&mut self) {
        self.record("restore");
    }

    fn show_failure(&mut self, message: &str) {
        self.record("failure");
        self.failures.push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct Counts {
    pub picked: usize,
    pub cancelled: usize,
    pub last: Option<(Color, PixelPoint)>,
}

pub struct RecordingObserver {
    counts: Rc<RefCell<Counts>>,
}

impl RecordingObserver {
    pub fn new() -> (Self, Rc<RefCell<Counts>>) {
        let counts = Rc::new(RefCell::new(Counts::default()));
        (
            Self {
                counts: Rc::clone(&counts),
            },
            counts,
        )
    }
}

impl OverlayObserver for RecordingObserver {
    fn on_picked(&mut self, color: Color, position: PixelPoint) {
        let mut counts = self.counts.borrow_mut();
        counts.picked += 1;
        counts.last = Some((color, position));
    }

    fn on_cancelled(&mut self) {
        self.counts.borrow_mut().cancelled += 1;
    }
}
