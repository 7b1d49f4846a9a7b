use std::{iter, time::Duration};

use blockfall_engine::ScoreKeeper;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::TEXT;

/// What the stats panel shows about the current round.
#[derive(Debug, Clone, Copy)]
pub struct RoundStats<'a> {
    pub score: &'a ScoreKeeper,
    pub round_time: Duration,
    pub rounds_finished: usize,
}

pub struct StatsDisplay<'a> {
    stats: RoundStats<'a>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    const TEXT_WIDTH: u16 = 20;

    pub fn new(stats: RoundStats<'a>) -> Self {
        Self { stats, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    /// Terminal size including the block.
    pub fn size(&self) -> (u16, u16) {
        let (margin_x, margin_y) = super::block_margin(self.block.as_ref());
        let rows = u16::try_from(ROWS.len()).unwrap_or(u16::MAX);
        (Self::TEXT_WIDTH + margin_x, rows + margin_y)
    }
}

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(&'static dyn Fn(&RoundStats) -> String),
    LabelValue(&'static str, &'static dyn Fn(&RoundStats) -> String),
}

const ROWS: &[Row] = &[
    Row::FullLabel("SCORE:"),
    Row::FullValue(&|stats| stats.score.score().to_string()),
    Row::FullLabel("TIME:"),
    Row::FullValue(&|stats| format_time(stats.round_time)),
    Row::Empty,
    Row::LabelValue("LEVEL:", &|stats| stats.score.level().to_string()),
    Row::LabelValue("LINES:", &|stats| {
        stats.score.total_cleared_lines().to_string()
    }),
    Row::LabelValue("PIECES:", &|stats| stats.score.locked_pieces().to_string()),
    Row::Empty,
    Row::LabelValue("SINGLES:", &|stats| {
        stats.score.line_clear_counter()[1].to_string()
    }),
    Row::LabelValue("DOUBLES:", &|stats| {
        stats.score.line_clear_counter()[2].to_string()
    }),
    Row::LabelValue("TRIPLES:", &|stats| {
        stats.score.line_clear_counter()[3].to_string()
    }),
    Row::LabelValue("TETRIS:", &|stats| {
        stats.score.line_clear_counter()[4].to_string()
    }),
    Row::Empty,
    Row::LabelValue("BEST:", &|stats| stats.score.best_score().to_string()),
    Row::LabelValue("ROUND:", &|stats| (stats.rounds_finished + 1).to_string()),
];

fn format_time(dur: Duration) -> String {
    format!(
        "{:0}:{:0>2}.{:0>2}",
        dur.as_secs() / 60,
        dur.as_secs() % 60,
        dur.subsec_millis() / 10
    )
}

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = TEXT;

        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value(&self.stats), style)
                        .right_aligned()
                        .render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(&self.stats), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::ZERO), "0:00.00");
        assert_eq!(format_time(Duration::from_millis(125_370)), "2:05.37");
    }
}
