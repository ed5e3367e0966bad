use std::io::{self, IsTerminal};
use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use thiserror::Error;

/// A surface extent: either a fixed cell count or the content-sized sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Natural,
    Cells(u16),
}

/// Input-focus behavior of the attached surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPolicy {
    /// Touches outside the surface bounds pass through; the surface never
    /// takes input focus.
    PassThrough,
    /// The surface can gain text focus while outside touches are still
    /// observed rather than blocked.
    Interactive,
    /// Text entry is active: input focus is held so an on-screen keyboard
    /// can appear, still without modally blocking outside input.
    TextEntry,
}

/// Full geometry/focus configuration of the floating surface. Re-applied to
/// the live surface on every drag step and state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub x: i32,
    pub y: i32,
    pub width: Dimension,
    pub height: Dimension,
    pub focus: FocusPolicy,
}

/// Attaching to the display layer is privileged; when the capability is
/// missing the whole attach fails before any surface state is created.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("display layer unavailable: {0}")]
    DisplayUnavailable(String),
    #[error("overlay capability denied: {0}")]
    Denied(String),
}

/// Narrow seam to the host window system. The controller drives everything
/// through this trait, so its state machine and drag math are testable
/// without a live display.
pub trait DisplaySurface {
    fn attach(&mut self, config: &SurfaceConfig) -> Result<(), CapabilityError>;
    fn update(&mut self, config: &SurfaceConfig) -> Result<()>;
    fn detach(&mut self) -> Result<()>;
    fn display_size(&self) -> (u16, u16);
}

/// Terminal-backed surface: attach claims the alternate screen in raw mode
/// with mouse capture, detach restores the terminal. Geometry updates take
/// effect on the next frame, drawn from the controller's current config.
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySurface for TerminalSurface {
    fn attach(&mut self, config: &SurfaceConfig) -> Result<(), CapabilityError> {
        if !io::stdout().is_terminal() {
            // Fail fast before touching terminal modes; the caller surfaces
            // the remediation hint and retries only on explicit user action.
            return Err(CapabilityError::Denied(
                "stdout is not an interactive terminal; run floatchat from a terminal emulator"
                    .to_string(),
            ));
        }

        enable_raw_mode()
            .map_err(|e| CapabilityError::DisplayUnavailable(e.to_string()))?;
        if let Err(e) = execute!(
            io::stdout(),
            EnterAlternateScreen,
            crossterm::event::EnableMouseCapture
        ) {
            let _ = disable_raw_mode();
            return Err(CapabilityError::DisplayUnavailable(e.to_string()));
        }

        log::info!("overlay surface attached at ({}, {})", config.x, config.y);
        Ok(())
    }

    fn update(&mut self, _config: &SurfaceConfig) -> Result<()> {
        // The terminal renderer draws from the controller's live config;
        // there is no retained window-system state to mutate here.
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        execute!(
            io::stdout(),
            crossterm::event::DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        disable_raw_mode()?;
        log::info!("overlay surface detached");
        Ok(())
    }

    fn display_size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((80, 24))
    }
}
