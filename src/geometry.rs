//! Physical-size geometry.
//!
//! Pure functions that turn a preference expressed in millimeters into pixel
//! dimensions for a concrete monitor, and fit a number of equally sized
//! windows onto it.  Everything here is integer arithmetic with truncating
//! division; callers and tests depend on the exact rounding.

/// A monitor with both pixel and physical geometry.
///
/// Produced by [`OutputRegistry`](crate::output::OutputRegistry) by joining
/// the window manager's output list with the display server's physical
/// sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub name: String,
    /// Horizontal resolution in pixels.
    pub width: i32,
    /// Vertical resolution in pixels.
    pub height: i32,
    pub physical_width: i32,
    pub physical_height: i32,
    /// X position on the virtual desktop (pixels).
    pub x: i32,
    /// Y position on the virtual desktop (pixels).
    pub y: i32,
}

/// Axis along which top-level containers are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Where a scratchpad sits on its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Center,
    Left,
    Right,
}

impl Position {
    /// Wire number of this position (`0` center, `1` left, `2` right).
    pub fn as_number(self) -> i64 {
        match self {
            Position::Center => 0,
            Position::Left => 1,
            Position::Right => 2,
        }
    }

    /// Inverse of [`as_number`](Position::as_number).
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            0 => Some(Position::Center),
            1 => Some(Position::Left),
            2 => Some(Position::Right),
            _ => None,
        }
    }

    /// Parse `center` / `left` / `right`, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "center" => Some(Position::Center),
            "left" => Some(Position::Left),
            "right" => Some(Position::Right),
            _ => None,
        }
    }
}

/// Size and absolute position of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Preferred window size in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalPreference {
    pub width_mm: i32,
    pub height_mm: i32,
}

/// Convert a physical length to pixels on a monitor whose `pixels` span
/// `physical_mm` millimeters.
///
/// Monitors that report no physical size (`physical_mm <= 0`) get the full
/// pixel dimension.
pub fn scale_to_pixels(preferred_mm: i32, pixels: i32, physical_mm: i32) -> i32 {
    if physical_mm <= 0 {
        return pixels;
    }
    (i64::from(preferred_mm) * i64::from(pixels) / i64::from(physical_mm)) as i32
}

/// Stack windows along the axis with more slack.
pub fn derive_direction(
    working_width: i32,
    working_height: i32,
    preferred_width: i32,
    preferred_height: i32,
) -> Direction {
    if working_height - preferred_height > working_width - preferred_width {
        Direction::Vertical
    } else {
        Direction::Horizontal
    }
}

/// The working unit of an output for one autogap decision.
///
/// Built fresh from an [`Output`] every time; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Output width minus the configured gap on both sides.
    pub width: i32,
    /// Output height minus the configured gap on both sides.
    pub height: i32,
    pub preferred_window_width: i32,
    pub preferred_window_height: i32,
    pub direction: Direction,
    pub gap_horizontal: i32,
    pub gap_vertical: i32,
}

impl Screen {
    /// Derive a screen from `output`, the preferred window size and the
    /// user's minimum outer gaps.
    pub fn new(
        output: &Output,
        preference: PhysicalPreference,
        gap_horizontal: i32,
        gap_vertical: i32,
    ) -> Self {
        let width = output
            .width
            .saturating_sub(gap_horizontal.saturating_mul(2))
            .max(0);
        let height = output
            .height
            .saturating_sub(gap_vertical.saturating_mul(2))
            .max(0);

        let preferred_window_width =
            scale_to_pixels(preference.width_mm, output.width, output.physical_width);
        let preferred_window_height =
            scale_to_pixels(preference.height_mm, output.height, output.physical_height);

        Self {
            width,
            height,
            preferred_window_width,
            preferred_window_height,
            direction: derive_direction(
                width,
                height,
                preferred_window_width,
                preferred_window_height,
            ),
            gap_horizontal,
            gap_vertical,
        }
    }

    /// Whether a container of the given size covers the whole working area.
    pub fn is_filled(&self, width: i32, height: i32) -> bool {
        width >= self.width && height >= self.height
    }

    /// Bounding box of `n` windows of the preferred size laid out along
    /// [`direction`](Screen::direction).
    ///
    /// When they don't fit along the primary axis, the clipped area is
    /// handed to the secondary axis; if that overflows too the whole working
    /// area is returned.
    pub fn fit_container(&self, n: usize) -> (i32, i32) {
        if n < 1 {
            return (0, 0);
        }

        let (working_primary, working_secondary, preferred_primary, preferred_secondary) =
            match self.direction {
                Direction::Horizontal => (
                    self.width,
                    self.height,
                    self.preferred_window_width,
                    self.preferred_window_height,
                ),
                Direction::Vertical => (
                    self.height,
                    self.width,
                    self.preferred_window_height,
                    self.preferred_window_width,
                ),
            };

        let (primary, secondary) = fit_along_axis(
            working_primary,
            working_secondary,
            preferred_primary,
            preferred_secondary,
            n,
        );

        match self.direction {
            Direction::Horizontal => (primary, secondary),
            Direction::Vertical => (secondary, primary),
        }
    }

    /// Outer gaps that center a container of the given size, on top of the
    /// configured minimum gaps.
    pub fn outer_gaps(&self, container_width: i32, container_height: i32) -> (i32, i32) {
        let horizontal =
            ((self.width - container_width).max(0) / 2).saturating_add(self.gap_horizontal);
        let vertical =
            ((self.height - container_height).max(0) / 2).saturating_add(self.gap_vertical);
        (horizontal, vertical)
    }
}

fn fit_along_axis(
    working_primary: i32,
    working_secondary: i32,
    preferred_primary: i32,
    preferred_secondary: i32,
    n: usize,
) -> (i32, i32) {
    let full = i64::from(preferred_primary) * n as i64;

    if full <= i64::from(working_primary) {
        return (full as i32, preferred_secondary.min(working_secondary));
    }

    if working_secondary <= preferred_secondary || working_primary <= 0 {
        return (working_primary, working_secondary);
    }

    let overflow_area = (full - i64::from(working_primary)) * i64::from(preferred_secondary);
    // Spread the clipped area over the full primary extent.
    let delta = overflow_area / i64::from(working_primary);
    let secondary = i64::from(preferred_secondary) + delta;

    if secondary >= i64::from(working_secondary) {
        return (working_primary, working_secondary);
    }
    (working_primary, secondary as i32)
}

/// Placement of a scratchpad window of `preference` on `output`.
///
/// Vertically centered; horizontally centered or docked against the middle
/// of the output for [`Position::Left`] / [`Position::Right`].  The result
/// is in global coordinates.
pub fn scratchpad_shape(output: &Output, position: Position, preference: PhysicalPreference) -> Shape {
    let mut width = scale_to_pixels(preference.width_mm, output.width, output.physical_width);
    let height = scale_to_pixels(preference.height_mm, output.height, output.physical_height)
        .min(output.height);

    let y = (output.height - height) / 2;
    let half = output.width / 2;

    let x = match position {
        Position::Center => {
            width = width.min(output.width);
            (output.width - width) / 2
        }
        Position::Left => {
            width = width.min(half);
            half - width
        }
        Position::Right => {
            width = width.min(half);
            half
        }
    };

    Shape {
        x: x + output.x,
        y: y + output.y,
        width,
        height,
    }
}
