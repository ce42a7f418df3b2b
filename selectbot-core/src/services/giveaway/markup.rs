//! Inline keyboards attached to campaign messages.

use selectbot_common::models::giveaway::Giveaway;
use selectbot_common::models::telegram::InlineKeyboardMarkup;

use crate::utils::links::DeepLinks;

/// Entry button under the published campaign. In test mode the button is
/// inert (callback only) so a preview can't collect entries.
pub(crate) fn entry_keyboard(
    giveaway: &Giveaway,
    test: bool,
    links: &DeepLinks,
) -> InlineKeyboardMarkup {
    if test {
        InlineKeyboardMarkup::single_callback(&giveaway.button_text, "magic")
    } else {
        InlineKeyboardMarkup::single_url(&giveaway.button_text, &links.entry_link(&giveaway.id))
    }
}

/// "View results" button under the placement report.
pub(crate) fn results_keyboard(link: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single_url("Посмотреть результаты", link)
}
