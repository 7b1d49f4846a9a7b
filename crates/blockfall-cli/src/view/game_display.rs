use blockfall_engine::{Game, Presentation, ScoreKeeper, SpawnSource};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use super::{FieldDisplay, NextDisplay, RoundStats, StatsDisplay, TEXT};

/// The whole play screen: stats, field, and next piece side by side.
#[derive(Debug)]
pub struct GameDisplay<'a, S, P> {
    game: &'a Game<S, ScoreKeeper, P>,
    paused: bool,
    flash_on: bool,
    banner: Option<&'a str>,
}

impl<'a, S, P> GameDisplay<'a, S, P> {
    pub fn new(game: &'a Game<S, ScoreKeeper, P>) -> Self {
        Self {
            game,
            paused: false,
            flash_on: false,
            banner: None,
        }
    }

    pub fn paused(self, paused: bool) -> Self {
        Self { paused, ..self }
    }

    /// Whether the rows being cleared are in their highlight phase.
    pub fn flash_on(self, flash_on: bool) -> Self {
        Self { flash_on, ..self }
    }

    pub fn banner(self, banner: Option<&'a str>) -> Self {
        Self { banner, ..self }
    }
}

impl<S, P> Widget for GameDisplay<'_, S, P>
where
    S: SpawnSource,
    P: Presentation,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl<S, P> Widget for &GameDisplay<'_, S, P>
where
    S: SpawnSource,
    P: Presentation,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        let game = self.game;
        let border_style = if self.paused {
            Color::Yellow
        } else if game.is_clearing() {
            Color::Cyan
        } else {
            Color::White
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(Padding::horizontal(1))
                .border_style(border_style)
                .style(TEXT)
        };

        let flash_rows = game.clearing_rows().filter(|_| self.flash_on).unwrap_or(&[]);
        let field = FieldDisplay::new(game.field())
            .piece(game.active_piece())
            .ghost(true)
            .flash_rows(flash_rows)
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(TEXT),
            );
        let next = NextDisplay::new(game.shapes().get(game.next_kind())).block(panel("NEXT"));
        let stats = StatsDisplay::new(RoundStats {
            score: game.scoring(),
            round_time: game.round_time(),
            rounds_finished: game.rounds_finished(),
        })
        .block(panel("STATS"));

        let sizes = [stats.size(), field.size(), next.size()];
        let [stats_area, field_area, next_area] =
            Layout::horizontal(sizes.map(|(width, _)| Constraint::Length(width)))
                .flex(Flex::Center)
                .spacing(1)
                .areas(area);
        // Panels hang from the top of their column
        let top = |column: Rect, (_, height): (u16, u16)| Rect {
            height: height.min(column.height),
            ..column
        };
        let stats_area = top(stats_area, sizes[0]);
        let field_area = top(field_area, sizes[1]);
        let next_area = top(next_area, sizes[2]);

        stats.render(stats_area, buf);
        field.render(field_area, buf);
        next.render(next_area, buf);

        let popup = if self.paused {
            Some(("PAUSED", Style::new().fg(Color::Black).bg(Color::Yellow)))
        } else {
            self.banner
                .map(|text| (text, Style::new().fg(Color::White).bg(Color::Red)))
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = field_area.centered_vertically(Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{GameConfig, PieceKind, ShapeSet};

    use super::*;

    struct Fixed;

    impl SpawnSource for Fixed {
        fn next_kind(&mut self) -> PieceKind {
            PieceKind::T
        }
    }

    fn screen_text(display: &GameDisplay<'_, Fixed, ()>) -> String {
        let area = Rect::new(0, 0, 80, 26);
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_panels_and_popup() {
        let game = Game::new(
            GameConfig::default(),
            ShapeSet::standard(),
            Fixed,
            ScoreKeeper::new(),
            (),
        )
        .unwrap();

        let text = screen_text(&GameDisplay::new(&game));
        assert!(text.contains("NEXT"));
        assert!(text.contains("SCORE:"));
        assert!(!text.contains("PAUSED"));

        let text = screen_text(&GameDisplay::new(&game).paused(true).banner(Some("TOP OUT")));
        assert!(text.contains("PAUSED"));
        assert!(!text.contains("TOP OUT"));

        let text = screen_text(&GameDisplay::new(&game).banner(Some("TOP OUT")));
        assert!(text.contains("TOP OUT"));
    }
}
