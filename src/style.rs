//! Terminal styling utilities
//!
//! Provides a consistent color scheme for CLI output:
//! - Semantic colors for status (green/yellow/red)
//! - Cyan for headers and technical terms
//! - Bold for important identifiers
//! - Dim for secondary information

use crossterm::style::Stylize;

/// Extension trait for consistent PRISW styling
///
/// Use these methods instead of direct color calls so every command renders
/// outputs and states the same way.
///
/// # Examples
///
/// ```
/// use crossterm::style::Stylize;
/// use prisw::style::PriswStyle;
///
/// println!("{}", "OUTPUTS:".header());
/// println!("{}", "active".success());
/// println!("{}", "Sink #[0-9]+".technical());
/// ```
pub trait PriswStyle: Stylize {
    /// Style for section headers (cyan bold)
    fn header(self) -> <<Self as Stylize>::Styled as Stylize>::Styled
    where
        Self: Sized,
        <Self as Stylize>::Styled: Stylize,
    {
        self.cyan().bold()
    }

    /// Style for the active / steady state (green)
    fn success(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.green()
    }

    /// Style for failures (red)
    fn error(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.red()
    }

    /// Style for pending switches and partial failures (yellow)
    fn warning(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.yellow()
    }

    /// Style for ids, priorities and patterns (cyan)
    fn technical(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.cyan()
    }
}

// Implement for all types that implement Stylize (String, &str, etc.)
impl<T: Stylize> PriswStyle for T {}
