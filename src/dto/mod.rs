pub mod line_events;
