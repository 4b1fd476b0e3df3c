// =============================================================================
// picker/session.rs - Orchestration d'une sélection
// picker/session.rs - Orchestration of one pick
// =============================================================================
//
// réduire l'hôte → pause → capture → overlay → attente du résultat → restaurer
// minimize host → settle → capture → overlay → wait for outcome → restore

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::common::Color;
use crate::config::PickerConfig;
use crate::error::{CaptureError, PickError, SessionConflictError};
use crate::geometry::{PixelPoint, ScreenPoint};
use crate::picker::capture::ScreenCapturer;
use crate::picker::overlay::{OverlayController, OverlayObserver, OverlaySurface};

// =============================================================================
// RÉSULTAT
// OUTCOME
// =============================================================================

/// Résultat terminal d'une session, émis une seule fois
/// Terminal result of a session, emitted once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PickOutcome {
    Picked { color: Color, position: PixelPoint },
    Cancelled,
}

impl PickOutcome {
    pub fn color(&self) -> Option<Color> {
        match self {
            PickOutcome::Picked { color, .. } => Some(*color),
            PickOutcome::Cancelled => None,
        }
    }
}

// =============================================================================
// FENÊTRE HÔTE
// HOST WINDOW
// =============================================================================

/// Fenêtre de l'application hôte (collaborateur externe)
/// Window of the host application (external collaborator)
pub trait HostWindow {
    fn minimize(&mut self);
    fn restore(&mut self);

    /// Single user-visible failure notice for a session that could not run.
    fn show_failure(&mut self, message: &str) {
        log::error!("{message}");
    }
}

/// Pas de fenêtre hôte à réduire (terminal non contrôlé)
/// No host window to minimize (terminal not under our control)
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedHost;

impl HostWindow for DetachedHost {
    fn minimize(&mut self) {}
    fn restore(&mut self) {}
}

/// Restaure l'hôte à la sortie de portée, quel que soit le chemin
/// Restores the host when leaving scope, whatever the path
struct Minimized<'h, H: HostWindow + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: HostWindow + ?Sized> Minimized<'h, H> {
    fn new(host: &'h mut H) -> Self {
        host.minimize();
        Self { host }
    }
}

impl<H: HostWindow + ?Sized> Drop for Minimized<'_, H> {
    fn drop(&mut self) {
        self.host.restore();
    }
}

// =============================================================================
// EXCLUSION DES SESSIONS
// SESSION EXCLUSION
// =============================================================================

static GLOBAL_SLOT: SessionSlot = SessionSlot::new();

/// Au plus une session active par emplacement
/// At most one active session per slot
#[derive(Debug, Default)]
pub struct SessionSlot {
    active: AtomicBool,
}

impl SessionSlot {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Emplacement unique du processus / Process-wide slot
    pub fn global() -> &'static SessionSlot {
        &GLOBAL_SLOT
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn claim(&self) -> Result<SessionGuard<'_>, SessionConflictError> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| SessionGuard { slot: self })
            .map_err(|_| SessionConflictError)
    }
}

#[derive(Debug)]
pub struct SessionGuard<'a> {
    slot: &'a SessionSlot,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.slot.active.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct ColorPickSession<'a, C, H, S>
where
    C: ScreenCapturer + ?Sized,
    H: HostWindow + ?Sized,
    S: OverlaySurface,
{
    slot: &'a SessionSlot,
    capturer: &'a mut C,
    host: &'a mut H,
    surface: S,
    config: PickerConfig,
    observers: Vec<Box<dyn OverlayObserver>>,
}

impl<'a, C, H, S> ColorPickSession<'a, C, H, S>
where
    C: ScreenCapturer + ?Sized,
    H: HostWindow + ?Sized,
    S: OverlaySurface,
{
    pub fn new(
        slot: &'a SessionSlot,
        capturer: &'a mut C,
        host: &'a mut H,
        surface: S,
        config: PickerConfig,
    ) -> Self {
        Self {
            slot,
            capturer,
            host,
            surface,
            config,
            observers: Vec::new(),
        }
    }

    /// Observers forwarded to the overlay once it exists.
    pub fn subscribe(&mut self, observer: Box<dyn OverlayObserver>) {
        self.observers.push(observer);
    }

    /// Lance la session et bloque jusqu'au résultat
    /// Runs the session and blocks until the outcome
    ///
    /// A capture failure aborts before any overlay is shown. The host window
    /// is restored on every path.
    pub fn run(self) -> Result<PickOutcome, PickError> {
        let slot = self.slot;
        let _guard = slot.claim()?;
        let ColorPickSession {
            capturer,
            host,
            surface,
            config,
            observers,
            ..
        } = self;

        let mut minimized = Minimized::new(host);
        std::thread::sleep(config.settle_delay());

        let screenshot = match capturer.capture_screen() {
            Ok(shot) => shot,
            Err(err) => {
                let err = PickError::from(err);
                log::warn!("session aborted: {err}");
                minimized.host.show_failure(&err.to_string());
                return Err(err);
            }
        };

        let mut overlay = OverlayController::new(screenshot, surface, &config);
        for observer in observers {
            overlay.subscribe(observer);
        }
        let result = overlay.run();
        // Surface and screenshot are released before the host comes back
        drop(overlay);

        match result {
            Ok(outcome) => {
                log::info!("session finished: {outcome:?}");
                Ok(outcome)
            }
            Err(err) => {
                log::warn!("session failed: {err}");
                minimized.host.show_failure(&err.to_string());
                Err(err)
            }
        }
    }
}

// =============================================================================
// LECTURE D'UN POINT
// SINGLE-POINT READ
// =============================================================================

/// Lit un seul pixel sans overlay: réduire l'hôte → pause → lire → restaurer
/// Reads one pixel without overlay: minimize host → settle → sample → restore
///
/// With `at = None` the pointer position is read once the host is out of the
/// way. Shares the session slot with [`ColorPickSession`].
pub fn sample_point<C, H, P>(
    slot: &SessionSlot,
    capturer: &mut C,
    host: &mut H,
    config: &PickerConfig,
    at: Option<ScreenPoint>,
    pointer: P,
) -> Result<Color, PickError>
where
    C: ScreenCapturer + ?Sized,
    H: HostWindow + ?Sized,
    P: FnOnce() -> Option<ScreenPoint>,
{
    let _guard = slot.claim()?;
    let mut minimized = Minimized::new(host);
    std::thread::sleep(config.settle_delay());

    let result = at
        .or_else(pointer)
        .ok_or_else(|| CaptureError::SurfaceUnavailable("pointer position unavailable".into()))
        .and_then(|point| {
            let color = capturer.capture_point(point)?;
            log::debug!("sampled {color} at {point:?}");
            Ok(color)
        })
        .map_err(PickError::from);

    if let Err(err) = &result {
        log::warn!("single-point read failed: {err}");
        minimized.host.show_failure(&err.to_string());
    }
    result
}
