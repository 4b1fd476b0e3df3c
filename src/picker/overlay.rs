// =============================================================================
// picker/overlay.rs - Contrôleur de l'overlay plein écran
// picker/overlay.rs - Full-screen overlay controller
// =============================================================================
//
// Machine à états / State machine:
//
//   Idle ──activate──▶ Active ──clic / click──▶ Picked ────┐
//                        │                                 ├──▶ Closed
//                        └────ESC / fermeture──▶ Cancelled ┘
//
// Le premier passage hors de Active fait foi; toute entrée ultérieure est
// ignorée. Un seul événement terminal est émis par session.
// The first transition out of Active wins; later input is ignored. Exactly
// one terminal event is emitted per session.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::common::Color;
use crate::config::PickerConfig;
use crate::error::{PickError, ResourceError, SampleError};
use crate::geometry::{LogicalPoint, LogicalSize, PixelPoint};
use crate::picker::capture::Screenshot;
use crate::picker::coords::to_screenshot_space;
use crate::picker::magnifier::{MagnifiedView, MagnifierSampler, PointerSample};
use crate::picker::session::PickOutcome;
use crate::picker::ticker::Ticker;

/// Longest wait when no tick is scheduled.
const IDLE_WAIT: Duration = Duration::from_millis(250);

// =============================================================================
// ÉVÉNEMENTS ET ÉTATS
// EVENTS AND STATES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Idle,
    Active,
    Picked,
    Cancelled,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    /// Platform key code of any other key (ignored)
    Other(u32),
}

/// Entrée reçue par la surface, en coordonnées logiques
/// Input received by the surface, in logical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayEvent {
    PointerMoved(LogicalPoint),
    PointerDown(LogicalPoint),
    KeyDown(Key),
    /// The platform closed the surface (treated as a cancellation)
    Closed,
}

// =============================================================================
// CONTRATS PLATEFORME
// PLATFORM CONTRACTS
// =============================================================================

/// Surface plein écran, toujours au premier plan
/// Full-screen, always-on-top surface
///
/// All methods are called from the session thread.
pub trait OverlaySurface {
    /// Displays the surface over the captured screenshot and starts
    /// delivering input.
    fn show(&mut self, screenshot: &Screenshot) -> Result<(), ResourceError>;

    /// Size of the surface as reported by pointer events.
    fn logical_size(&self) -> LogicalSize;

    /// Current pointer position, `None` when it cannot be queried.
    fn pointer(&self) -> Option<PointerSample>;

    /// Waits up to `timeout` for the next input event. Must not spin.
    fn wait_event(&mut self, timeout: Duration) -> Option<OverlayEvent>;

    fn draw_crosshair(&mut self, at: LogicalPoint);

    fn show_magnifier(&mut self, view: &MagnifiedView) -> Result<(), ResourceError>;

    fn hide_magnifier(&mut self);

    /// Releases the surface and every per-tick resource it still holds.
    fn close(&mut self) -> Result<(), ResourceError>;
}

/// Callbacks `onPicked` / `onCancelled`
pub trait OverlayObserver {
    fn on_picked(&mut self, _color: Color, _position: PixelPoint) {}
    fn on_cancelled(&mut self) {}
}

/// Commande transmise depuis un autre thread
/// Command handed over from another thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteCommand {
    Cancel,
}

/// Poignée clonable pour annuler depuis n'importe quel thread
/// Cloneable handle to cancel from any thread
///
/// Requests are queued and applied on the session thread on its next turn.
#[derive(Debug, Clone)]
pub struct OverlayRemote {
    tx: Sender<RemoteCommand>,
}

impl OverlayRemote {
    /// Returns `false` once the overlay is gone.
    pub fn cancel(&self) -> bool {
        self.tx.send(RemoteCommand::Cancel).is_ok()
    }
}

// =============================================================================
// CONTRÔLEUR
// CONTROLLER
// =============================================================================

pub struct OverlayController<S: OverlaySurface> {
    state: OverlayState,
    screenshot: Screenshot,
    surface: S,
    sampler: MagnifierSampler,
    ticker: Ticker,
    observers: Vec<Box<dyn OverlayObserver>>,
    remote_tx: Sender<RemoteCommand>,
    remote_rx: Receiver<RemoteCommand>,
    outcome: Option<PickOutcome>,
    magnifier_visible: bool,
}

impl<S: OverlaySurface> OverlayController<S> {
    pub fn new(screenshot: Screenshot, surface: S, config: &PickerConfig) -> Self {
        let (remote_tx, remote_rx) = crossbeam_channel::unbounded();
        Self {
            state: OverlayState::Idle,
            screenshot,
            surface,
            sampler: MagnifierSampler::new(&config.magnifier),
            ticker: Ticker::new(config.tick_interval()),
            observers: Vec::new(),
            remote_tx,
            remote_rx,
            outcome: None,
            magnifier_visible: false,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn outcome(&self) -> Option<PickOutcome> {
        self.outcome
    }

    /// Capture en lecture seule (diagnostic) / Read-only screenshot (diagnostics)
    pub fn screenshot(&self) -> &Screenshot {
        &self.screenshot
    }

    /// Couleur sous un point logique, bornée à la capture
    /// Color under a logical point, clamped to the screenshot
    pub fn pixel_color(&self, point: LogicalPoint) -> Color {
        let pixel = self.to_pixel(point);
        self.screenshot.pixel(pixel).unwrap_or_default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn OverlayObserver>) {
        self.observers.push(observer);
    }

    pub fn remote(&self) -> OverlayRemote {
        OverlayRemote {
            tx: self.remote_tx.clone(),
        }
    }

    /// Idle → Active : affiche la surface et démarre la loupe
    /// Idle → Active: shows the surface and starts the magnifier
    pub fn activate(&mut self) -> Result<(), ResourceError> {
        if self.state != OverlayState::Idle {
            log::warn!("overlay activation ignored in state {:?}", self.state);
            return Ok(());
        }
        if let Err(err) = self.surface.show(&self.screenshot) {
            // Nothing was shown but the surface may hold partial resources
            if let Err(close_err) = self.surface.close() {
                log::warn!("overlay teardown after failed show: {close_err}");
            }
            self.state = OverlayState::Closed;
            return Err(err);
        }
        self.state = OverlayState::Active;
        self.ticker.start(Instant::now());
        log::debug!("overlay Idle -> Active");
        Ok(())
    }

    /// Traite un événement; renvoie le résultat s'il est terminal
    /// Handles one event; returns the outcome when it is terminal
    pub fn handle_event(&mut self, event: OverlayEvent) -> Option<PickOutcome> {
        if self.state != OverlayState::Active {
            log::trace!("ignored {event:?} in state {:?}", self.state);
            return None;
        }
        match event {
            OverlayEvent::PointerMoved(at) => {
                self.surface.draw_crosshair(at);
                None
            }
            OverlayEvent::PointerDown(at) => {
                let position = self.to_pixel(at);
                let color = self.screenshot.pixel(position).unwrap_or_default();
                Some(self.finish(PickOutcome::Picked { color, position }))
            }
            OverlayEvent::KeyDown(Key::Escape) | OverlayEvent::Closed => {
                Some(self.finish(PickOutcome::Cancelled))
            }
            OverlayEvent::KeyDown(Key::Other(_)) => None,
        }
    }

    /// Escape: cancels synchronously, stopping the sampler and releasing the
    /// surface before returning.
    pub fn cancel(&mut self) -> Option<PickOutcome> {
        self.handle_event(OverlayEvent::KeyDown(Key::Escape))
    }

    /// Un tick de la loupe; les échecs masquent l'aperçu pour ce tick
    /// One magnifier tick; failures hide the preview for that tick
    pub fn tick(&mut self) {
        if self.state != OverlayState::Active {
            return;
        }
        let logical = self.surface.logical_size();
        let view = self
            .surface
            .pointer()
            .ok_or(SampleError::NoPointer)
            .and_then(|pointer| self.sampler.sample(&self.screenshot, pointer, logical));
        let shown = view.and_then(|view| self.surface.show_magnifier(&view).map_err(SampleError::from));
        match shown {
            Ok(()) => self.magnifier_visible = true,
            Err(err) => {
                log::trace!("magnifier hidden this tick: {err}");
                if self.magnifier_visible {
                    self.surface.hide_magnifier();
                    self.magnifier_visible = false;
                }
            }
        }
    }

    /// Boucle de session: attend les événements sans attente active
    /// Session loop: waits for events without busy-waiting
    pub fn run(&mut self) -> Result<PickOutcome, PickError> {
        if self.state == OverlayState::Idle {
            self.activate()?;
        }
        loop {
            if let Some(outcome) = self.outcome {
                return Ok(outcome);
            }
            if self.state != OverlayState::Active {
                // Closed without a recorded outcome (failed activation)
                return Ok(PickOutcome::Cancelled);
            }

            if let Ok(RemoteCommand::Cancel) = self.remote_rx.try_recv() {
                log::debug!("cancellation requested from another thread");
                self.cancel();
                continue;
            }

            let timeout = self
                .ticker
                .time_until_due(Instant::now())
                .unwrap_or(IDLE_WAIT);
            if let Some(event) = self.surface.wait_event(timeout) {
                if self.handle_event(event).is_some() {
                    continue;
                }
            }
            if self.ticker.poll(Instant::now()) {
                self.tick();
            }
        }
    }

    fn to_pixel(&self, point: LogicalPoint) -> PixelPoint {
        to_screenshot_space(point, self.surface.logical_size(), self.screenshot.size())
    }

    /// Active → Picked/Cancelled → Closed
    fn finish(&mut self, outcome: PickOutcome) -> PickOutcome {
        self.state = match outcome {
            PickOutcome::Picked { .. } => OverlayState::Picked,
            PickOutcome::Cancelled => OverlayState::Cancelled,
        };
        log::debug!("overlay Active -> {:?}", self.state);
        self.ticker.stop();
        self.outcome = Some(outcome);

        for observer in &mut self.observers {
            match outcome {
                PickOutcome::Picked { color, position } => observer.on_picked(color, position),
                PickOutcome::Cancelled => observer.on_cancelled(),
            }
        }

        self.teardown();
        outcome
    }

    fn teardown(&mut self) {
        if self.magnifier_visible {
            self.surface.hide_magnifier();
            self.magnifier_visible = false;
        }
        if let Err(err) = self.surface.close() {
            log::warn!("overlay teardown: {err}");
        }
        self.state = OverlayState::Closed;
        log::debug!("overlay closed");
    }
}

impl<S: OverlaySurface> Drop for OverlayController<S> {
    fn drop(&mut self) {
        // Error or panic path: never leave the overlay on screen
        if self.state == OverlayState::Active {
            self.ticker.stop();
            self.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ScreenPoint;
    use crate::handle::HandleTracker;
    use crate::picker::mock::{synthetic_screenshot, MockSurface, RecordingObserver};

    fn controller(surface: MockSurface) -> OverlayController<MockSurface> {
        let config = PickerConfig {
            tick_interval_ms: 0,
            ..PickerConfig::default()
        };
        OverlayController::new(synthetic_screenshot(16, 16), surface, &config)
    }

    #[test]
    fn test_activation_shows_surface() {
        let tracker = HandleTracker::new();
        let mut overlay = controller(MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0)));
        assert_eq!(overlay.state(), OverlayState::Idle);
        overlay.activate().unwrap();
        assert_eq!(overlay.state(), OverlayState::Active);
        assert_eq!(tracker.outstanding(), 1);
        drop(overlay);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_events_ignored_before_activation() {
        let tracker = HandleTracker::new();
        let mut overlay = controller(MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0)));
        assert_eq!(overlay.handle_event(OverlayEvent::PointerDown(LogicalPoint::new(1.0, 1.0))), None);
        assert_eq!(overlay.state(), OverlayState::Idle);
    }

    #[test]
    fn test_pointer_move_only_redraws() {
        let tracker = HandleTracker::new();
        let surface = MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0));
        let log = surface.log();
        let mut overlay = controller(surface);
        overlay.activate().unwrap();
        assert_eq!(overlay.handle_event(OverlayEvent::PointerMoved(LogicalPoint::new(3.0, 4.0))), None);
        assert_eq!(overlay.state(), OverlayState::Active);
        assert_eq!(log.borrow().crosshairs, vec![LogicalPoint::new(3.0, 4.0)]);
    }

    #[test]
    fn test_pick_uses_mapped_pixel() {
        let tracker = HandleTracker::new();
        // Overlay logique 8x8 sur capture 16x16 / 8x8 logical overlay on a 16x16 capture
        let mut overlay = controller(MockSurface::new(&tracker, LogicalSize::new(8.0, 8.0)));
        overlay.activate().unwrap();
        let outcome = overlay.handle_event(OverlayEvent::PointerDown(LogicalPoint::new(2.0, 3.0)));
        assert_eq!(
            outcome,
            Some(PickOutcome::Picked {
                color: Color::new(4, 6, 0),
                position: PixelPoint::new(4, 6),
            })
        );
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_first_terminal_event_wins() {
        let tracker = HandleTracker::new();
        let mut overlay = controller(MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0)));
        let (observer, counts) = RecordingObserver::new();
        overlay.subscribe(Box::new(observer));
        overlay.activate().unwrap();

        let first = overlay.handle_event(OverlayEvent::PointerDown(LogicalPoint::new(1.0, 1.0)));
        assert!(matches!(first, Some(PickOutcome::Picked { .. })));
        assert_eq!(overlay.handle_event(OverlayEvent::KeyDown(Key::Escape)), None);
        assert_eq!(overlay.handle_event(OverlayEvent::PointerDown(LogicalPoint::new(5.0, 5.0))), None);

        assert_eq!(counts.borrow().picked, 1);
        assert_eq!(counts.borrow().cancelled, 0);
        assert_eq!(counts.borrow().last, Some((Color::new(1, 1, 0), PixelPoint::new(1, 1))));
        assert_eq!(overlay.outcome(), first);
    }

    #[test]
    fn test_escape_then_pointer_down_stays_cancelled() {
        let tracker = HandleTracker::new();
        let surface = MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0));
        let log = surface.log();
        let mut overlay = controller(surface);
        let (observer, counts) = RecordingObserver::new();
        overlay.subscribe(Box::new(observer));
        overlay.activate().unwrap();

        assert_eq!(overlay.handle_event(OverlayEvent::KeyDown(Key::Escape)), Some(PickOutcome::Cancelled));
        // Fermeture synchrone / Synchronous close
        assert_eq!(log.borrow().closes, 1);
        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(overlay.handle_event(OverlayEvent::PointerDown(LogicalPoint::new(1.0, 1.0))), None);

        assert_eq!(counts.borrow().cancelled, 1);
        assert_eq!(counts.borrow().picked, 0);
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let tracker = HandleTracker::new();
        let mut overlay = controller(MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0)));
        overlay.activate().unwrap();
        assert_eq!(overlay.handle_event(OverlayEvent::KeyDown(Key::Other(0x41))), None);
        assert_eq!(overlay.state(), OverlayState::Active);
    }

    #[test]
    fn test_platform_close_cancels() {
        let tracker = HandleTracker::new();
        let mut overlay = controller(MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0)));
        overlay.activate().unwrap();
        assert_eq!(overlay.handle_event(OverlayEvent::Closed), Some(PickOutcome::Cancelled));
    }

    #[test]
    fn test_tick_shows_then_hides_on_failure() {
        let tracker = HandleTracker::new();
        let surface = MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0));
        let log = surface.log();
        let mut overlay = controller(surface);
        overlay.activate().unwrap();

        log.borrow_mut().pointer = Some(PointerSample {
            overlay: LogicalPoint::new(8.0, 8.0),
            screen: ScreenPoint::new(8, 8),
        });
        overlay.tick();
        assert_eq!(log.borrow().magnifier_shows, 1);
        assert_eq!(tracker.outstanding(), 2);

        // Pointeur perdu: aperçu masqué, session continue
        // Pointer lost: preview hidden, session goes on
        log.borrow_mut().pointer = None;
        overlay.tick();
        assert_eq!(log.borrow().magnifier_hides, 1);
        assert_eq!(tracker.outstanding(), 1);
        assert_eq!(overlay.state(), OverlayState::Active);

        // Échec d'acquisition: même traitement / Acquisition failure: same handling
        log.borrow_mut().pointer = Some(PointerSample {
            overlay: LogicalPoint::new(1.0, 1.0),
            screen: ScreenPoint::new(1, 1),
        });
        log.borrow_mut().fail_magnifier = true;
        overlay.tick();
        assert_eq!(overlay.state(), OverlayState::Active);
        assert_eq!(tracker.outstanding(), 1);
    }

    #[test]
    fn test_tick_on_tiny_screenshot_hides_preview() {
        let tracker = HandleTracker::new();
        let surface = MockSurface::new(&tracker, LogicalSize::new(4.0, 4.0));
        let log = surface.log();
        log.borrow_mut().pointer = Some(PointerSample {
            overlay: LogicalPoint::new(0.0, 0.0),
            screen: ScreenPoint::new(0, 0),
        });
        let mut overlay = OverlayController::new(synthetic_screenshot(4, 4), surface, &PickerConfig::default());
        overlay.activate().unwrap();
        overlay.tick();
        assert_eq!(log.borrow().magnifier_shows, 0);
        assert_eq!(overlay.state(), OverlayState::Active);
    }

    #[test]
    fn test_failed_show_closes_surface() {
        let tracker = HandleTracker::new();
        let surface = MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0));
        let log = surface.log();
        log.borrow_mut().fail_show = true;
        let mut overlay = controller(surface);
        assert!(overlay.activate().is_err());
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert_eq!(log.borrow().closes, 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_run_processes_script_and_ticks() {
        let tracker = HandleTracker::new();
        let surface = MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0));
        let log = surface.log();
        {
            let mut l = log.borrow_mut();
            l.pointer = Some(PointerSample {
                overlay: LogicalPoint::new(8.0, 8.0),
                screen: ScreenPoint::new(8, 8),
            });
            l.script.push_back(Some(OverlayEvent::PointerMoved(LogicalPoint::new(8.0, 8.0))));
            l.script.push_back(None);
            l.script.push_back(Some(OverlayEvent::PointerDown(LogicalPoint::new(9.0, 2.0))));
        }
        let mut overlay = controller(surface);
        let outcome = overlay.run().unwrap();
        assert_eq!(
            outcome,
            PickOutcome::Picked {
                color: Color::new(9, 2, 1),
                position: PixelPoint::new(9, 2),
            }
        );
        assert!(log.borrow().magnifier_shows >= 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_remote_cancel_from_other_thread() {
        let tracker = HandleTracker::new();
        let surface = MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0));
        let log = surface.log();
        log.borrow_mut().idle_forever = true;
        let mut overlay = controller(surface);
        let remote = overlay.remote();
        let worker = std::thread::spawn(move || remote.cancel());
        assert!(worker.join().unwrap());
        assert_eq!(overlay.run().unwrap(), PickOutcome::Cancelled);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_pixel_color_accessor_clamps() {
        let tracker = HandleTracker::new();
        let overlay = controller(MockSurface::new(&tracker, LogicalSize::new(16.0, 16.0)));
        assert_eq!(overlay.pixel_color(LogicalPoint::new(-5.0, 100.0)), Color::new(0, 15, 1));
        assert_eq!(overlay.screenshot().size().width, 16);
    }
}
