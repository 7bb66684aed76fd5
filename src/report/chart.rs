use thiserror::Error;

use super::pdf::{Font, Page, Rgb};
use crate::model::{EventType, TeamAnalysis};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("{event} value {value} is not a percentage")]
    InvalidValue { event: EventType, value: f64 },
}

pub fn event_color(event: EventType) -> Rgb {
    match event {
        EventType::Shots => Rgb::hex(0x1f3a93),
        EventType::Corners => Rgb::hex(0xc9a516),
        EventType::Cards => Rgb::hex(0x007acc),
        EventType::Goals => Rgb::hex(0xe04848),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub event: EventType,
    /// Percentage in [0, 100].
    pub value: f64,
}

/// Vertical bar chart of one team's P(X ≥ 1) per event.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn at_least_one(team: &TeamAnalysis) -> Result<Self, ChartError> {
        let bars = team
            .at_least_one
            .iter()
            .map(|(event, &value)| {
                if value.is_finite() && (0.0..=100.0).contains(&value) {
                    Ok(Bar { event, value })
                } else {
                    Err(ChartError::InvalidValue { event, value })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BarChart {
            title: format!("{} - chance of at least one (%)", team.name),
            bars,
        })
    }

    /// Draw inside the box with lower-left corner `(x, y)`.
    pub fn draw(&self, page: &mut Page, x: f32, y: f32, width: f32, height: f32) {
        const TITLE_SPACE: f32 = 18.0;
        const LABEL_SPACE: f32 = 14.0;
        const VALUE_SPACE: f32 = 12.0;

        page.text(Font::Bold, 10.0, Rgb::hex(0x1f3a93), x, y + height - 10.0, &self.title);

        let plot_bottom = y + LABEL_SPACE;
        let plot_height = height - TITLE_SPACE - LABEL_SPACE - VALUE_SPACE;
        page.line(Rgb::GREY, 0.5, (x, plot_bottom), (x + width, plot_bottom));

        if self.bars.is_empty() {
            return;
        }
        let slot = width / self.bars.len() as f32;
        let bar_width = slot * 0.6;
        for (i, bar) in self.bars.iter().enumerate() {
            let left = x + slot * i as f32 + (slot - bar_width) / 2.0;
            let bar_height = plot_height * (bar.value / 100.0) as f32;
            page.fill_rect(event_color(bar.event), left, plot_bottom, bar_width, bar_height);
            page.text(
                Font::Regular,
                8.0,
                Rgb::BLACK,
                left,
                plot_bottom + bar_height + 3.0,
                &format!("{:.2}%", bar.value),
            );
            page.text(Font::Regular, 8.0, Rgb::BLACK, left, y + 3.0, bar.event.label());
        }
    }
}
