mod markup;
mod quiz;
mod result;
mod status;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::session::Phase;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.phase() {
        Phase::Loading => status::render_loading(frame, area, app),
        Phase::LoadFailed => status::render_load_failed(frame, area, app),
        Phase::NothingToShow => status::render_nothing_to_show(frame, area, app),
        Phase::InProgress => quiz::render(frame, area, app),
        Phase::Complete => result::render(frame, area, app),
    }
}
