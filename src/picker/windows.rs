// =============================================================================
// COLOR PICKER - VERSION WINDOWS
// =============================================================================
// Capture GDI du bureau virtuel + fenêtre plein écran avec réticule et loupe
// GDI capture of the virtual desktop + full-screen window with crosshair and
// magnifier
// =============================================================================

// -----------------------------------------------------------------------------
// IMPORTS - Configuration
// -----------------------------------------------------------------------------
use crate::config::{
    PickerConfig,
    CROSSHAIR_COLOR,        // Couleur du réticule / Crosshair color
    CROSSHAIR_LENGTH,       // Longueur des traits / Stroke length
    CROSSHAIR_THICKNESS,    // Épaisseur des traits / Stroke thickness
    MAGNIFIER_BORDER_WIDTH, // Bordure de la loupe / Magnifier border
};

// -----------------------------------------------------------------------------
// IMPORTS - Types du moteur
// IMPORTS - Engine types
// -----------------------------------------------------------------------------
use crate::common::{format_hex_color, should_use_dark_text, Color};
use crate::error::{CaptureError, PickError, ResourceError};
use crate::geometry::{LogicalPoint, LogicalSize, ScreenPoint, ScreenRect};
use crate::handle::{HandleTracker, NativeHandle};
use crate::picker::capture::{check_region, PixelBuffer, ScreenCapturer, Screenshot};
use crate::picker::magnifier::{MagnifiedView, PointerSample};
use crate::picker::overlay::{Key, OverlayEvent, OverlaySurface};
use crate::picker::session::{sample_point, ColorPickSession, HostWindow, PickOutcome, SessionSlot};

// -----------------------------------------------------------------------------
// IMPORTS - Windows API
// -----------------------------------------------------------------------------
use windows::{
    core::*,
    Win32::{
        Foundation::*,
        Graphics::Gdi::*,
        System::{Console::GetConsoleWindow, LibraryLoader::GetModuleHandleW},
        UI::{
            Input::KeyboardAndMouse::*,
            WindowsAndMessaging::*,
        },
    },
};

// -----------------------------------------------------------------------------
// IMPORTS - Bibliothèque standard Rust
// IMPORTS - Rust standard library
// -----------------------------------------------------------------------------
use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

// =============================================================================
// CONSTANTES
// CONSTANTS
// =============================================================================

/// Hauteur de l'étiquette hexadécimale sous la loupe
/// Height of the hex label under the magnifier
const LABEL_HEIGHT: i32 = 20;

// =============================================================================
// ÉTAT DE DESSIN (thread de session uniquement)
// PAINT STATE (session thread only)
// =============================================================================

/// Loupe à dessiner, en coordonnées client
/// Magnifier to draw, in client coordinates
#[derive(Clone, Copy)]
struct MagnifierPaint {
    bitmap: HBITMAP,
    x: i32,
    y: i32,
    size: i32,
    center: Color,
}

/// État lu par WM_PAINT et rempli par la procédure de fenêtre
/// State read by WM_PAINT and filled by the window procedure
#[derive(Default)]
struct PaintState {
    background: Vec<u8>,
    background_width: i32,
    background_height: i32,
    crosshair: Option<(i32, i32)>,
    magnifier: Option<MagnifierPaint>,
    events: VecDeque<OverlayEvent>,
}

thread_local! {
    static PAINT: RefCell<PaintState> = RefCell::new(PaintState::default());
}

/// Nom de la classe de fenêtre Windows
/// Windows window class name
fn window_class() -> PCWSTR {
    w!("ScreenColorPickerOverlay")
}

fn push_event(event: OverlayEvent) {
    PAINT.with(|p| p.borrow_mut().events.push_back(event));
}

fn pop_event() -> Option<OverlayEvent> {
    PAINT.with(|p| p.borrow_mut().events.pop_front())
}

// =============================================================================
// UTILITAIRES GDI
// GDI UTILITIES
// =============================================================================

/// Color → COLORREF (0x00BBGGRR)
fn colorref(color: Color) -> COLORREF {
    COLORREF(color.r as u32 | (color.g as u32) << 8 | (color.b as u32) << 16)
}

/// En-tête BITMAPINFO pour des lignes BGRA 32 bits de haut en bas
/// BITMAPINFO header for top-down 32-bit BGRA rows
fn bgra_info(width: i32, height: i32) -> BITMAPINFO {
    BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: -height, // Négatif = top-down / Negative = top-down
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn release_failed(kind: &'static str, detail: impl std::fmt::Display) -> ResourceError {
    ResourceError::Release {
        kind,
        detail: detail.to_string(),
    }
}

fn check_bool(kind: &'static str, ok: BOOL) -> std::result::Result<(), ResourceError> {
    if ok.as_bool() {
        Ok(())
    } else {
        Err(release_failed(kind, Error::from_win32()))
    }
}

fn acquire_screen_dc(tracker: &HandleTracker) -> std::result::Result<NativeHandle<HDC>, ResourceError> {
    tracker.try_acquire(
        "screen DC",
        || {
            let dc = unsafe { GetDC(HWND::default()) };
            (!dc.is_invalid()).then_some(dc)
        },
        |dc| match unsafe { ReleaseDC(HWND::default(), dc) } {
            1 => Ok(()),
            _ => Err(release_failed("screen DC", "ReleaseDC returned 0")),
        },
    )
}

fn acquire_memory_dc(
    tracker: &HandleTracker,
    compatible: HDC,
) -> std::result::Result<NativeHandle<HDC>, ResourceError> {
    tracker.try_acquire(
        "memory DC",
        || {
            let dc = unsafe { CreateCompatibleDC(compatible) };
            (!dc.is_invalid()).then_some(dc)
        },
        |dc| check_bool("memory DC", unsafe { DeleteDC(dc) }),
    )
}

fn acquire_bitmap(
    tracker: &HandleTracker,
    compatible: HDC,
    width: i32,
    height: i32,
) -> std::result::Result<NativeHandle<HBITMAP>, ResourceError> {
    tracker.try_acquire(
        "bitmap",
        || {
            let bitmap = unsafe { CreateCompatibleBitmap(compatible, width, height) };
            (!bitmap.is_invalid()).then_some(bitmap)
        },
        |bitmap| check_bool("bitmap", unsafe { DeleteObject(bitmap) }),
    )
}

/// Sélectionne `bitmap` dans `dc`; l'ancien objet est remis à la libération
/// Selects `bitmap` into `dc`; the previous object is put back on release
fn select_bitmap(
    tracker: &HandleTracker,
    dc: HDC,
    bitmap: HBITMAP,
) -> std::result::Result<NativeHandle<(HDC, HGDIOBJ)>, ResourceError> {
    tracker.try_acquire(
        "bitmap selection",
        || {
            let previous = unsafe { SelectObject(dc, bitmap) };
            (!previous.is_invalid()).then_some((dc, previous))
        },
        |(dc, previous)| {
            unsafe { SelectObject(dc, previous) };
            Ok(())
        },
    )
}

// =============================================================================
// CAPTURE D'ÉCRAN
// SCREEN CAPTURE
// =============================================================================

/// Capture GDI (BitBlt + GetDIBits) du bureau virtuel
/// GDI capture (BitBlt + GetDIBits) of the virtual desktop
pub struct GdiCapturer {
    tracker: HandleTracker,
}

impl GdiCapturer {
    pub fn new(tracker: &HandleTracker) -> Self {
        Self {
            tracker: tracker.clone(),
        }
    }
}

impl ScreenCapturer for GdiCapturer {
    fn virtual_bounds(&self) -> std::result::Result<ScreenRect, CaptureError> {
        let (x, y, width, height) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };
        if width <= 0 || height <= 0 {
            return Err(CaptureError::SurfaceUnavailable(
                "virtual screen metrics are empty".into(),
            ));
        }
        Ok(ScreenRect::new(x, y, width as u32, height as u32))
    }

    fn capture_region(&mut self, region: ScreenRect) -> std::result::Result<PixelBuffer, CaptureError> {
        check_region(region, self.virtual_bounds()?)?;
        let width = region.width as i32;
        let height = region.height as i32;

        // Déclarés dans l'ordre inverse de libération
        // Declared in reverse release order
        let screen_dc = acquire_screen_dc(&self.tracker)?;
        let memory_dc = acquire_memory_dc(&self.tracker, screen_dc.get())?;
        let bitmap = acquire_bitmap(&self.tracker, screen_dc.get(), width, height)?;
        let selection = select_bitmap(&self.tracker, memory_dc.get(), bitmap.get())?;

        unsafe {
            BitBlt(
                memory_dc.get(),
                0,
                0,
                width,
                height,
                screen_dc.get(),
                region.x,
                region.y,
                SRCCOPY | CAPTUREBLT,
            )
        }
        .map_err(|err| CaptureError::SurfaceUnavailable(err.message()))?;

        // GetDIBits exige que le bitmap ne soit plus sélectionné
        // GetDIBits requires the bitmap to be deselected
        selection.release()?;

        let mut bmi = bgra_info(width, height);
        let mut data = vec![0u8; region.size().area() * 4];
        let lines = unsafe {
            GetDIBits(
                memory_dc.get(),
                bitmap.get(),
                0,
                height as u32,
                Some(data.as_mut_ptr() as *mut _),
                &mut bmi,
                DIB_RGB_COLORS,
            )
        };
        if lines != height {
            return Err(CaptureError::SurfaceUnavailable(format!(
                "GetDIBits copied {lines} of {height} lines"
            )));
        }

        // Les pixels sont copiés: un échec de libération ne change plus rien
        // Pixels are copied: a release failure no longer matters
        bitmap.release_or_log();
        memory_dc.release_or_log();
        screen_dc.release_or_log();

        PixelBuffer::from_bgra(region.width, region.height, region.width as usize * 4, &data)
            .ok_or(CaptureError::EmptyRegion)
    }
}

/// Position actuelle du curseur en coordonnées écran
/// Current cursor position in screen coordinates
pub fn cursor_position() -> Option<ScreenPoint> {
    let mut pt = POINT::default();
    unsafe { GetCursorPos(&mut pt) }.ok()?;
    Some(ScreenPoint::new(pt.x, pt.y))
}

// =============================================================================
// SURFACE PLEIN ÉCRAN
// FULL-SCREEN SURFACE
// =============================================================================

pub struct WindowSurface {
    tracker: HandleTracker,
    hinstance: HINSTANCE,
    logical: LogicalSize,
    // Ordre de libération: loupe, fenêtre, classe
    // Release order: magnifier, window, class
    magnifier: Option<NativeHandle<HBITMAP>>,
    window: Option<NativeHandle<HWND>>,
    class: Option<NativeHandle<HINSTANCE>>,
}

impl WindowSurface {
    pub fn new(tracker: &HandleTracker) -> std::result::Result<Self, ResourceError> {
        let module = unsafe { GetModuleHandleW(None) }.map_err(|_| ResourceError::Acquire {
            kind: "module handle",
        })?;
        Ok(Self {
            tracker: tracker.clone(),
            hinstance: module.into(),
            logical: LogicalSize::default(),
            magnifier: None,
            window: None,
            class: None,
        })
    }

    fn hwnd(&self) -> Option<HWND> {
        self.window.as_ref().map(NativeHandle::get)
    }

    fn invalidate(&self) {
        if let Some(hwnd) = self.hwnd() {
            unsafe {
                let _ = InvalidateRect(hwnd, None, FALSE);
            }
        }
    }

    fn register_class(&mut self) -> std::result::Result<(), ResourceError> {
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: self.hinstance,
            hCursor: unsafe { LoadCursorW(None, IDC_CROSS) }.unwrap_or_default(),
            lpszClassName: window_class(),
            ..Default::default()
        };
        let class = self.tracker.try_acquire(
            "window class",
            || (unsafe { RegisterClassExW(&wc) } != 0).then_some(self.hinstance),
            |hinstance| {
                unsafe { UnregisterClassW(window_class(), hinstance) }
                    .map_err(|err| release_failed("window class", err.message()))
            },
        )?;
        self.class = Some(class);
        Ok(())
    }

    fn create_window(&mut self, bounds: ScreenRect) -> std::result::Result<(), ResourceError> {
        let hinstance = self.hinstance;
        let window = self.tracker.try_acquire(
            "overlay window",
            || unsafe {
                CreateWindowExW(
                    WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                    window_class(),
                    w!(""),
                    WS_POPUP,
                    bounds.x,
                    bounds.y,
                    bounds.width as i32,
                    bounds.height as i32,
                    None,
                    None,
                    hinstance,
                    None,
                )
            }
            .ok(),
            |hwnd| {
                unsafe { DestroyWindow(hwnd) }.map_err(|err| release_failed("overlay window", err.message()))
            },
        )?;
        self.window = Some(window);
        Ok(())
    }

    /// Vide la file de messages Windows sans bloquer
    /// Drains the Windows message queue without blocking
    fn pump_messages(&self) {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn release_magnifier(&mut self) -> std::result::Result<(), ResourceError> {
        PAINT.with(|p| p.borrow_mut().magnifier = None);
        match self.magnifier.take() {
            Some(bitmap) => bitmap.release(),
            None => Ok(()),
        }
    }
}

impl OverlaySurface for WindowSurface {
    fn show(&mut self, screenshot: &Screenshot) -> std::result::Result<(), ResourceError> {
        let size = screenshot.size();
        PAINT.with(|p| {
            *p.borrow_mut() = PaintState {
                background: screenshot.buffer().to_bgra(),
                background_width: size.width as i32,
                background_height: size.height as i32,
                ..PaintState::default()
            }
        });

        self.register_class()?;
        self.create_window(screenshot.bounds())?;
        let hwnd = self.hwnd().ok_or(ResourceError::Acquire { kind: "overlay window" })?;

        let mut client = RECT::default();
        unsafe { GetClientRect(hwnd, &mut client) }
            .map_err(|_| ResourceError::Acquire { kind: "client area" })?;
        self.logical = LogicalSize::new(
            (client.right - client.left) as f64,
            (client.bottom - client.top) as f64,
        );

        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = SetForegroundWindow(hwnd);
            let _ = SetFocus(hwnd);
            let _ = SetCapture(hwnd);
        }
        log::debug!(
            "overlay window {}x{} over a {}x{} screenshot",
            self.logical.width,
            self.logical.height,
            size.width,
            size.height
        );
        Ok(())
    }

    fn logical_size(&self) -> LogicalSize {
        self.logical
    }

    fn pointer(&self) -> Option<PointerSample> {
        let hwnd = self.hwnd()?;
        let screen = cursor_position()?;
        let mut pt = POINT {
            x: screen.x,
            y: screen.y,
        };
        if !unsafe { ScreenToClient(hwnd, &mut pt) }.as_bool() {
            return None;
        }
        Some(PointerSample {
            overlay: LogicalPoint::new(pt.x as f64, pt.y as f64),
            screen,
        })
    }

    fn wait_event(&mut self, timeout: Duration) -> Option<OverlayEvent> {
        if let Some(event) = pop_event() {
            return Some(event);
        }
        let millis = timeout.as_millis().min(u32::MAX as u128) as u32;
        unsafe {
            let _ = MsgWaitForMultipleObjects(None, FALSE, millis, QS_ALLINPUT);
        }
        self.pump_messages();
        pop_event()
    }

    fn draw_crosshair(&mut self, at: LogicalPoint) {
        PAINT.with(|p| p.borrow_mut().crosshair = Some((at.x.round() as i32, at.y.round() as i32)));
        self.invalidate();
    }

    fn show_magnifier(&mut self, view: &MagnifiedView) -> std::result::Result<(), ResourceError> {
        let hwnd = self.hwnd().ok_or(ResourceError::Acquire { kind: "overlay window" })?;
        let size = view.bitmap.width() as i32;

        let screen_dc = acquire_screen_dc(&self.tracker)?;
        let bitmap = acquire_bitmap(&self.tracker, screen_dc.get(), size, size)?;
        let bmi = bgra_info(size, view.bitmap.height() as i32);
        let bits = view.bitmap.to_bgra();
        let lines = unsafe {
            SetDIBits(
                screen_dc.get(),
                bitmap.get(),
                0,
                view.bitmap.height(),
                bits.as_ptr() as *const _,
                &bmi,
                DIB_RGB_COLORS,
            )
        };
        if lines == 0 {
            return Err(ResourceError::Acquire { kind: "magnifier bitmap" });
        }
        screen_dc.release_or_log();

        let mut origin = POINT {
            x: view.placement.x,
            y: view.placement.y,
        };
        unsafe {
            let _ = ScreenToClient(hwnd, &mut origin);
        }

        if let Err(err) = self.release_magnifier() {
            log::warn!("previous magnifier release: {err}");
        }
        let paint = MagnifierPaint {
            bitmap: bitmap.get(),
            x: origin.x,
            y: origin.y,
            size,
            center: view.center,
        };
        self.magnifier = Some(bitmap);
        PAINT.with(|p| p.borrow_mut().magnifier = Some(paint));
        self.invalidate();
        Ok(())
    }

    fn hide_magnifier(&mut self) {
        if let Err(err) = self.release_magnifier() {
            log::warn!("magnifier release: {err}");
        }
        self.invalidate();
    }

    fn close(&mut self) -> std::result::Result<(), ResourceError> {
        unsafe {
            let _ = ReleaseCapture();
        }
        let magnifier = self.release_magnifier();
        let window = self.window.take().map_or(Ok(()), NativeHandle::release);
        self.pump_messages();
        let class = self.class.take().map_or(Ok(()), NativeHandle::release);
        PAINT.with(|p| *p.borrow_mut() = PaintState::default());
        magnifier.and(window).and(class)
    }
}

// =============================================================================
// DESSIN
// PAINTING
// =============================================================================

/// Dessine la capture, le réticule et la loupe (double buffer)
/// Paints the screenshot, the crosshair and the magnifier (double buffered)
fn paint_window(hwnd: HWND, hdc: HDC) {
    let mut client = RECT::default();
    if unsafe { GetClientRect(hwnd, &mut client) }.is_err() {
        return;
    }
    let width = client.right - client.left;
    let height = client.bottom - client.top;

    PAINT.with(|p| {
        let state = p.borrow();
        unsafe {
            let hdc_mem = CreateCompatibleDC(hdc);
            let hbitmap = CreateCompatibleBitmap(hdc, width, height);
            if hdc_mem.is_invalid() || hbitmap.is_invalid() {
                let _ = DeleteObject(hbitmap);
                let _ = DeleteDC(hdc_mem);
                return;
            }
            let old_bitmap = SelectObject(hdc_mem, hbitmap);

            // Capture mise à l'échelle de la zone client
            // Screenshot scaled to the client area
            let bmi = bgra_info(state.background_width, state.background_height);
            SetStretchBltMode(hdc_mem, COLORONCOLOR);
            StretchDIBits(
                hdc_mem,
                0,
                0,
                width,
                height,
                0,
                0,
                state.background_width,
                state.background_height,
                Some(state.background.as_ptr() as *const _),
                &bmi,
                DIB_RGB_COLORS,
                SRCCOPY,
            );

            if let Some((x, y)) = state.crosshair {
                draw_crosshair(hdc_mem, x, y);
            }
            if let Some(magnifier) = state.magnifier {
                draw_magnifier(hdc_mem, hdc, magnifier);
            }

            let _ = BitBlt(hdc, 0, 0, width, height, hdc_mem, 0, 0, SRCCOPY);
            SelectObject(hdc_mem, old_bitmap);
            let _ = DeleteObject(hbitmap);
            let _ = DeleteDC(hdc_mem);
        }
    });
}

unsafe fn draw_crosshair(hdc: HDC, x: i32, y: i32) {
    let half = (CROSSHAIR_LENGTH / 2.0) as i32;
    let pen = CreatePen(PS_SOLID, CROSSHAIR_THICKNESS, colorref(CROSSHAIR_COLOR));
    let old_pen = SelectObject(hdc, pen);
    let _ = MoveToEx(hdc, x - half, y, None);
    let _ = LineTo(hdc, x + half + 1, y);
    let _ = MoveToEx(hdc, x, y - half, None);
    let _ = LineTo(hdc, x, y + half + 1);
    SelectObject(hdc, old_pen);
    let _ = DeleteObject(pen);
}

unsafe fn draw_magnifier(hdc_mem: HDC, hdc: HDC, m: MagnifierPaint) {
    let hdc_src = CreateCompatibleDC(hdc);
    if hdc_src.is_invalid() {
        return;
    }
    let old = SelectObject(hdc_src, m.bitmap);
    let _ = BitBlt(hdc_mem, m.x, m.y, m.size, m.size, hdc_src, 0, 0, SRCCOPY);
    SelectObject(hdc_src, old);
    let _ = DeleteDC(hdc_src);

    // Bordure de la couleur visée / Border in the targeted color
    let pen = CreatePen(PS_SOLID, MAGNIFIER_BORDER_WIDTH, colorref(m.center));
    let old_pen = SelectObject(hdc_mem, pen);
    let old_brush = SelectObject(hdc_mem, GetStockObject(NULL_BRUSH));
    let _ = Rectangle(hdc_mem, m.x, m.y, m.x + m.size, m.y + m.size);
    SelectObject(hdc_mem, old_brush);
    SelectObject(hdc_mem, old_pen);
    let _ = DeleteObject(pen);

    // Étiquette hexadécimale / Hex label
    let label_rect = RECT {
        left: m.x,
        top: m.y + m.size,
        right: m.x + m.size,
        bottom: m.y + m.size + LABEL_HEIGHT,
    };
    let brush = CreateSolidBrush(colorref(m.center));
    FillRect(hdc_mem, &label_rect, brush);
    let _ = DeleteObject(brush);

    let text_color = if should_use_dark_text(m.center) {
        Color::new(0, 0, 0)
    } else {
        Color::new(255, 255, 255)
    };
    SetBkMode(hdc_mem, TRANSPARENT);
    SetTextColor(hdc_mem, colorref(text_color));
    let label: Vec<u16> = format_hex_color(m.center).encode_utf16().collect();
    let _ = TextOutW(hdc_mem, m.x + 4, m.y + m.size + 2, &label);
}

// =============================================================================
// WINDOW PROCEDURE
// =============================================================================

extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wp: WPARAM, lp: LPARAM) -> LRESULT {
    unsafe {
        match msg {
            WM_PAINT => {
                let mut ps = PAINTSTRUCT::default();
                let hdc = BeginPaint(hwnd, &mut ps);
                paint_window(hwnd, hdc);
                let _ = EndPaint(hwnd, &ps);
                LRESULT(0)
            }
            WM_MOUSEMOVE | WM_LBUTTONDOWN => {
                let x = (lp.0 & 0xFFFF) as i16 as f64;
                let y = ((lp.0 >> 16) & 0xFFFF) as i16 as f64;
                let at = LogicalPoint::new(x, y);
                push_event(if msg == WM_MOUSEMOVE {
                    OverlayEvent::PointerMoved(at)
                } else {
                    OverlayEvent::PointerDown(at)
                });
                LRESULT(0)
            }
            WM_KEYDOWN => {
                let vk = VIRTUAL_KEY(wp.0 as u16);
                push_event(OverlayEvent::KeyDown(if vk == VK_ESCAPE {
                    Key::Escape
                } else {
                    Key::Other(vk.0 as u32)
                }));
                LRESULT(0)
            }
            WM_CLOSE => {
                // Fermeture par la plateforme (Alt+F4...): la session décide
                // Platform close (Alt+F4...): the session decides
                push_event(OverlayEvent::Closed);
                LRESULT(0)
            }
            WM_ERASEBKGND => {
                // Ne pas effacer le fond (évite le scintillement)
                LRESULT(1)
            }
            _ => DefWindowProcW(hwnd, msg, wp, lp),
        }
    }
}

// =============================================================================
// FENÊTRE HÔTE (console)
// HOST WINDOW (console)
// =============================================================================

/// Console de lancement, réduite pendant la sélection
/// Launching console, minimized during the pick
pub struct ConsoleHost {
    hwnd: Option<HWND>,
}

impl ConsoleHost {
    pub fn attach() -> Self {
        let hwnd = unsafe { GetConsoleWindow() };
        Self {
            hwnd: (!hwnd.is_invalid()).then_some(hwnd),
        }
    }
}

impl HostWindow for ConsoleHost {
    fn minimize(&mut self) {
        if let Some(hwnd) = self.hwnd {
            unsafe {
                let _ = ShowWindow(hwnd, SW_MINIMIZE);
            }
        }
    }

    fn restore(&mut self) {
        if let Some(hwnd) = self.hwnd {
            unsafe {
                let _ = ShowWindow(hwnd, SW_RESTORE);
                let _ = SetForegroundWindow(hwnd);
            }
        }
    }
}

// =============================================================================
// API PUBLIQUE
// =============================================================================

pub fn run(config: &PickerConfig) -> std::result::Result<PickOutcome, PickError> {
    let tracker = HandleTracker::new();
    let mut capturer = GdiCapturer::new(&tracker);
    let mut host = ConsoleHost::attach();
    let surface = WindowSurface::new(&tracker)?;

    let session = ColorPickSession::new(SessionSlot::global(), &mut capturer, &mut host, surface, *config);
    let outcome = session.run();

    if tracker.outstanding() != 0 {
        log::warn!("{} native handles still open after the session", tracker.outstanding());
    }
    outcome
}

/// Couleur d'un point de l'écran, sans overlay
/// Color of one screen point, without overlay
pub fn capture_point(
    at: Option<ScreenPoint>,
    config: &PickerConfig,
) -> std::result::Result<Color, PickError> {
    let tracker = HandleTracker::new();
    let mut capturer = GdiCapturer::new(&tracker);
    let mut host = ConsoleHost::attach();
    sample_point(SessionSlot::global(), &mut capturer, &mut host, config, at, cursor_position)
}
