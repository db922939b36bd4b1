//! Tabular view of the full classification ledger

use iced::widget::{column, container, row, scrollable, text, Column};
use iced::{Element, Length};

use crate::state::data::ClassificationEntry;
use crate::Message;

/// Height of the scrollable table body
const BODY_HEIGHT: f32 = 220.0;
const INDEX_WIDTH: f32 = 40.0;

pub fn view(entries: &[ClassificationEntry]) -> Element<'_, Message> {
    if entries.is_empty() {
        return text("No classifications saved yet.").size(14).into();
    }

    let header = row![
        text("").width(Length::Fixed(INDEX_WIDTH)),
        text("Imagem").size(14).width(Length::FillPortion(3)),
        text("Classificacao").size(14).width(Length::FillPortion(1))
    ]
    .spacing(12);

    let rows: Vec<Element<'_, Message>> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            row![
                text(index.to_string()).size(14).width(Length::Fixed(INDEX_WIDTH)),
                text(entry.image.as_str()).size(14).width(Length::FillPortion(3)),
                text(entry.label.as_str()).size(14).width(Length::FillPortion(1))
            ]
            .spacing(12)
            .into()
        })
        .collect();

    let body = scrollable(Column::with_children(rows).spacing(4)).height(Length::Fixed(BODY_HEIGHT));

    container(column![header, body].spacing(6))
        .padding(10)
        .width(Length::Fill)
        .into()
}
