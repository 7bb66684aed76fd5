use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Match statistic modelled as a Poisson count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Shots,
    Corners,
    Cards,
    Goals,
}

impl EventType {
    /// Display order used by every table, chart and report.
    pub const ALL: [EventType; 4] = [
        EventType::Shots,
        EventType::Corners,
        EventType::Cards,
        EventType::Goals,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventType::Shots => "Shots",
            EventType::Corners => "Corners",
            EventType::Cards => "Cards",
            EventType::Goals => "Goals",
        }
    }

    /// Largest per-match mean accepted from user input.
    pub fn max_rate(self) -> f64 {
        match self {
            EventType::Shots => 80.0,
            EventType::Corners => 50.0,
            EventType::Cards => 15.0,
            EventType::Goals => 20.0,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per [`EventType`], indexable by the event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerEvent<T> {
    pub shots: T,
    pub corners: T,
    pub cards: T,
    pub goals: T,
}

impl<T> PerEvent<T> {
    pub fn from_fn(mut f: impl FnMut(EventType) -> T) -> Self {
        PerEvent {
            shots: f(EventType::Shots),
            corners: f(EventType::Corners),
            cards: f(EventType::Cards),
            goals: f(EventType::Goals),
        }
    }

    /// Like [`PerEvent::from_fn`], stopping at the first error in display order.
    pub fn try_from_fn<E>(mut f: impl FnMut(EventType) -> Result<T, E>) -> Result<Self, E> {
        Ok(PerEvent {
            shots: f(EventType::Shots)?,
            corners: f(EventType::Corners)?,
            cards: f(EventType::Cards)?,
            goals: f(EventType::Goals)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventType, &T)> {
        EventType::ALL.into_iter().map(move |event| (event, &self[event]))
    }
}

impl<T> Index<EventType> for PerEvent<T> {
    type Output = T;

    fn index(&self, event: EventType) -> &T {
        match event {
            EventType::Shots => &self.shots,
            EventType::Corners => &self.corners,
            EventType::Cards => &self.cards,
            EventType::Goals => &self.goals,
        }
    }
}
