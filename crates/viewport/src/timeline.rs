use foundation::{Time, TimeSpan};
use runtime::{Event, EventBus};
use serde::Serialize;
use tracing::warn;

/// Fraction of the width left empty on each side of the track.
pub const TRACK_INSET: f64 = 0.15;

/// Event names longer than this overflow their label.
pub const MAX_EVENT_NAME_LEN: usize = 12;

/// Undrained [`DateChanged`] events kept before the oldest are discarded.
pub const MAX_PENDING_DATE_CHANGES: usize = 64;

/// Emitted whenever a drag selects a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateChanged {
    pub time: Time,
}

/// An annotated moment shown on the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub time: Time,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    pub start: Time,
    pub end: Time,
    pub current_date: Time,
    pub marker_position: f64,
    pub bounds: [f64; 2],
}

/// Horizontal date track with a draggable marker.
///
/// The marker travels between symmetric insets matching the rounded ends of
/// the drawn track. Selected dates reach the rest of the system only through
/// the [`DateChanged`] events on this timeline's bus.
#[derive(Debug)]
pub struct Timeline {
    span: TimeSpan,
    width: f64,
    height: f64,
    current: Time,
    marker_position: f64,
    bounds: [f64; 2],
    events: Vec<TimelineEvent>,
    bus: EventBus<DateChanged>,
}

impl Timeline {
    pub fn new(span: TimeSpan, width: f64, height: f64) -> Self {
        let bounds = marker_bounds(width, height);
        Self {
            span,
            width,
            height,
            current: span.start,
            marker_position: bounds[0],
            bounds,
            events: Vec::new(),
            bus: EventBus::bounded(MAX_PENDING_DATE_CHANGES),
        }
    }

    /// The year leading up to `now`.
    pub fn trailing_year(now: Time, width: f64, height: f64) -> Self {
        Self::new(TimeSpan::trailing_year(now), width, height)
    }

    pub fn span(&self) -> TimeSpan {
        self.span
    }

    pub fn current_date(&self) -> Time {
        self.current
    }

    pub fn marker_position(&self) -> f64 {
        self.marker_position
    }

    pub fn bounds(&self) -> [f64; 2] {
        self.bounds
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn state(&self) -> TimelineState {
        TimelineState {
            start: self.span.start,
            end: self.span.end,
            current_date: self.current,
            marker_position: self.marker_position,
            bounds: self.bounds,
        }
    }

    /// Recompute the drag bounds; the selected date keeps its place.
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.bounds = marker_bounds(self.width, self.height);
        self.marker_position = self.position_for(self.current);
    }

    /// Replace the date range, e.g. once the dataset's span is known.
    pub fn set_span(&mut self, span: TimeSpan) {
        self.span = span;
        self.current = span.lerp(span.fraction_of(self.current));
        self.marker_position = self.position_for(self.current);
    }

    /// Marker position for `time`, clamped to the track.
    pub fn position_for(&self, time: Time) -> f64 {
        let [min, max] = self.bounds;
        min + self.span.fraction_of(time) * (max - min)
    }

    /// Move the marker to `pointer_x` and select the matching date.
    pub fn on_drag(&mut self, pointer_x: f64) -> Time {
        let [min, max] = self.bounds;
        let x = if pointer_x.is_nan() {
            min
        } else {
            pointer_x.clamp(min, max)
        };
        let fraction = if max > min { (x - min) / (max - min) } else { 0.0 };
        let time = self.span.lerp(fraction);

        self.marker_position = x;
        self.current = time;
        self.bus.emit(DateChanged { time });
        time
    }

    pub fn add_event(&mut self, time: Time, name: impl Into<String>, description: impl Into<String>) {
        let name = name.into();
        if name.chars().count() > MAX_EVENT_NAME_LEN {
            warn!(name = %name, "timeline event name may be too long to display");
        }
        self.events.push(TimelineEvent {
            time,
            name,
            description: description.into(),
        });
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Where an event sits as a fraction of the full width (0.15 ..= 0.85).
    pub fn event_fraction(&self, event: &TimelineEvent) -> f64 {
        TRACK_INSET + (1.0 - 2.0 * TRACK_INSET) * self.span.fraction_of(event.time)
    }

    pub fn date_changes(&self) -> &EventBus<DateChanged> {
        &self.bus
    }

    /// Pending selections since the last drain, oldest first. Only the most
    /// recent [`MAX_PENDING_DATE_CHANGES`] are retained between drains.
    pub fn drain_date_changes(&mut self) -> Vec<Event<DateChanged>> {
        self.bus.drain()
    }
}

/// `[width * 0.15 + height / 2, width - that]`, collapsed to a single point
/// when the track is too narrow.
fn marker_bounds(width: f64, height: f64) -> [f64; 2] {
    let min = width * TRACK_INSET + height / 2.0;
    let max = width - min;
    [min, max.max(min)]
}

#[cfg(test)]
mod tests {
    use super::{DateChanged, MAX_PENDING_DATE_CHANGES, Timeline};
    use foundation::{SECONDS_PER_YEAR, Time, TimeSpan};

    fn timeline() -> Timeline {
        Timeline::new(TimeSpan::new(Time(1_000.0), Time(101_000.0)), 1000.0, 40.0)
    }

    #[test]
    fn bounds_are_symmetric_insets() {
        let t = timeline();
        assert_eq!(t.bounds(), [170.0, 830.0]);
        assert_eq!(t.marker_position(), 170.0);
        assert_eq!(t.current_date(), Time(1_000.0));
    }

    #[test]
    fn drag_clamps_to_span_ends() {
        let mut t = timeline();
        assert_eq!(t.on_drag(-50.0), Time(1_000.0));
        assert_eq!(t.marker_position(), 170.0);
        assert_eq!(t.on_drag(5_000.0), Time(101_000.0));
        assert_eq!(t.marker_position(), 830.0);
    }

    #[test]
    fn midpoint_maps_to_halfway_date() {
        let mut t = timeline();
        let time = t.on_drag(500.0);
        assert!((time.0 - 51_000.0).abs() <= 1.0);
    }

    #[test]
    fn drags_emit_date_changed_events() {
        let mut t = timeline();
        t.on_drag(170.0);
        t.on_drag(830.0);
        let events = t.drain_date_changes();
        let times: Vec<_> = events.iter().map(|e| e.payload).collect();
        assert_eq!(
            times,
            vec![
                DateChanged { time: Time(1_000.0) },
                DateChanged { time: Time(101_000.0) }
            ]
        );
        assert!(t.date_changes().is_empty());
    }

    #[test]
    fn undrained_date_changes_keep_only_the_most_recent() {
        let mut t = timeline();
        for i in 0..(MAX_PENDING_DATE_CHANGES + 10) {
            t.on_drag(170.0 + i as f64);
        }
        let last = t.on_drag(830.0);
        let events = t.drain_date_changes();
        assert_eq!(events.len(), MAX_PENDING_DATE_CHANGES);
        assert_eq!(events.last().map(|e| e.payload.time), Some(last));
    }

    #[test]
    fn set_width_keeps_selected_date() {
        let mut t = timeline();
        t.on_drag(500.0);
        t.set_width(2000.0);
        assert_eq!(t.bounds(), [320.0, 1680.0]);
        assert!((t.marker_position() - 1000.0).abs() < 1e-9);
        let time = t.on_drag(1000.0);
        assert!((time.0 - 51_000.0).abs() <= 1.0);
    }

    #[test]
    fn narrow_tracks_collapse_to_start() {
        let mut t = Timeline::new(TimeSpan::new(Time(0.0), Time(10.0)), 10.0, 40.0);
        assert_eq!(t.bounds()[0], t.bounds()[1]);
        assert_eq!(t.on_drag(3.0), Time(0.0));
    }

    #[test]
    fn events_sit_inside_the_track() {
        let mut t = timeline();
        t.add_event(Time(51_000.0), "Outbreak", "First confirmed case");
        t.add_event(Time(1_000.0), "A much longer event name", "");
        assert_eq!(t.events().len(), 2);
        assert!((t.event_fraction(&t.events()[0]) - 0.5).abs() < 1e-9);
        assert!((t.event_fraction(&t.events()[1]) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn set_span_clamps_current_date() {
        let mut t = timeline();
        t.on_drag(830.0);
        t.set_span(TimeSpan::new(Time(0.0), Time(50_000.0)));
        assert_eq!(t.current_date(), Time(50_000.0));
        assert_eq!(t.marker_position(), 830.0);
    }

    #[test]
    fn trailing_year_window() {
        let t = Timeline::trailing_year(Time(2.0 * SECONDS_PER_YEAR), 800.0, 30.0);
        assert_eq!(t.span().start, Time(SECONDS_PER_YEAR));
        assert_eq!(t.state().end, Time(2.0 * SECONDS_PER_YEAR));
    }
}
