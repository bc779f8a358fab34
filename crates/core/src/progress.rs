use thiserror::Error;

use crate::model::{Lesson, LessonKind, PositionMarkers};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress total must be finite and > 0, got {0}")]
    InvalidTotal(f64),
    #[error("position must be finite, got {0}")]
    InvalidPosition(f64),
}

/// Percentage at which a lesson counts as completed.
pub const COMPLETION_THRESHOLD: f64 = 90.0;

/// `position / total * 100`, or 0 when the total is not positive.
#[must_use]
pub fn progress_percentage(position: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    position / total * 100.0
}

#[must_use]
pub fn is_completed(progress: f64) -> bool {
    progress >= COMPLETION_THRESHOLD
}

//
// ─── TOTALS ────────────────────────────────────────────────────────────────────
//

/// Placeholder totals used when a lesson does not describe its own length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressDefaults {
    pub placeholder_pages: u32,
    pub placeholder_slides: u32,
    pub fallback_video_secs: u32,
}

impl Default for ProgressDefaults {
    fn default() -> Self {
        Self {
            placeholder_pages: 10,
            placeholder_slides: 10,
            fallback_video_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUnit {
    Page,
    Slide,
    Second,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    /// Read from lesson metadata or the media itself.
    Content,
    /// Derived from the lesson's declared duration.
    Duration,
    /// Substituted because nothing described the lesson length.
    Placeholder,
}

/// Unit count a lesson's progress is measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTotal {
    pub units: f64,
    pub unit: ProgressUnit,
    pub source: TotalSource,
}

impl ResolvedTotal {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.source == TotalSource::Placeholder
    }
}

/// Resolve the total for a lesson.
///
/// `media_duration_secs` is the duration reported by a loaded video, when known.
#[must_use]
pub fn resolve_total(
    lesson: &Lesson,
    defaults: &ProgressDefaults,
    media_duration_secs: Option<f64>,
) -> ResolvedTotal {
    let meta = lesson.metadata();
    match lesson.kind() {
        LessonKind::Document => match meta.and_then(|m| m.pages()) {
            Some(pages) => ResolvedTotal {
                units: f64::from(pages),
                unit: ProgressUnit::Page,
                source: TotalSource::Content,
            },
            None => ResolvedTotal {
                units: f64::from(defaults.placeholder_pages.max(1)),
                unit: ProgressUnit::Page,
                source: TotalSource::Placeholder,
            },
        },
        LessonKind::Presentation => match meta.and_then(|m| m.slides()) {
            Some(slides) => ResolvedTotal {
                units: f64::from(slides),
                unit: ProgressUnit::Slide,
                source: TotalSource::Content,
            },
            None => ResolvedTotal {
                units: f64::from(defaults.placeholder_slides.max(1)),
                unit: ProgressUnit::Slide,
                source: TotalSource::Placeholder,
            },
        },
        LessonKind::Video => {
            if let Some(secs) = media_duration_secs.filter(|s| s.is_finite() && *s > 0.0) {
                ResolvedTotal {
                    units: secs,
                    unit: ProgressUnit::Second,
                    source: TotalSource::Content,
                }
            } else if lesson.duration_minutes() > 0 {
                ResolvedTotal {
                    units: f64::from(lesson.duration_minutes()) * 60.0,
                    unit: ProgressUnit::Second,
                    source: TotalSource::Duration,
                }
            } else {
                ResolvedTotal {
                    units: f64::from(defaults.fallback_video_secs.max(1)),
                    unit: ProgressUnit::Second,
                    source: TotalSource::Placeholder,
                }
            }
        }
        LessonKind::Interactive => ResolvedTotal {
            units: 1.0,
            unit: ProgressUnit::Step,
            source: TotalSource::Content,
        },
    }
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Per-second output of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub time_spent_secs: u64,
    pub progress: f64,
    pub completed: bool,
}

/// Viewing state of one open lesson.
///
/// Time is counted in whole seconds by `tick`, only after `start`
/// (first mount or first play). `restart` is the only way to reset it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTracker {
    total: f64,
    unit: ProgressUnit,
    position: f64,
    elapsed_secs: u64,
    started: bool,
}

impl ProgressTracker {
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTotal` unless `total` is finite and positive.
    pub fn new(total: f64, unit: ProgressUnit) -> Result<Self, ProgressError> {
        if !total.is_finite() || total <= 0.0 {
            return Err(ProgressError::InvalidTotal(total));
        }
        Ok(Self {
            total,
            unit,
            position: 0.0,
            elapsed_secs: 0,
            started: false,
        })
    }

    /// # Errors
    ///
    /// Propagates `ProgressError::InvalidTotal` from the resolved total.
    pub fn for_total(total: ResolvedTotal) -> Result<Self, ProgressError> {
        Self::new(total.units, total.unit)
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Move to `position`, bounded to `0..=total`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidPosition` for NaN or infinite input.
    pub fn set_position(&mut self, position: f64) -> Result<(), ProgressError> {
        if !position.is_finite() {
            return Err(ProgressError::InvalidPosition(position));
        }
        self.position = position.clamp(0.0, self.total);
        Ok(())
    }

    /// Replace the total once the real length becomes known (e.g. video metadata loaded).
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTotal` unless `total` is finite and positive.
    pub fn set_total(&mut self, total: f64) -> Result<(), ProgressError> {
        if !total.is_finite() || total <= 0.0 {
            return Err(ProgressError::InvalidTotal(total));
        }
        self.total = total;
        self.position = self.position.min(total);
        Ok(())
    }

    /// Carry time spent in earlier viewing sessions into this one.
    pub fn resume_time(&mut self, secs: u64) {
        self.elapsed_secs = secs;
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self) {
        if self.started {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
    }

    pub fn restart(&mut self) {
        self.position = 0.0;
        self.elapsed_secs = 0;
        self.started = true;
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.total
    }

    #[must_use]
    pub fn unit(&self) -> ProgressUnit {
        self.unit
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let progress = progress_percentage(self.position, self.total);
        ProgressSnapshot {
            time_spent_secs: self.elapsed_secs,
            progress,
            completed: is_completed(progress),
        }
    }

    /// Position markers matching the tracker's unit.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn markers(&self) -> PositionMarkers {
        // position is clamped to 0..=total, and totals come from u32 counts for pages/slides.
        let whole = self.position.round() as u32;
        match self.unit {
            ProgressUnit::Page => PositionMarkers {
                page: Some(whole),
                ..PositionMarkers::default()
            },
            ProgressUnit::Slide => PositionMarkers {
                slide: Some(whole),
                ..PositionMarkers::default()
            },
            ProgressUnit::Second => PositionMarkers {
                time_offset_secs: Some(self.position),
                ..PositionMarkers::default()
            },
            ProgressUnit::Step => PositionMarkers::default(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
