//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`blocks`]: The latest blocks table with its age and block lag footer
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Latest blocks (blocks::render)       │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod blocks;
pub mod common;
pub mod theme;

pub use blocks::PLACEHOLDER;
pub use theme::Theme;
