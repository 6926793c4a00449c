//! The form fields shared by the new and edit card pages.

use maud::{Markup, html};

use crate::{
    card::{CardBuilder, CardType},
    html::{FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// Render the inputs for a card, pre-filled from `values`.
pub fn card_form_fields(values: &CardBuilder, error_message: Option<&str>) -> Markup {
    let optional_amount = |amount: f64| (amount != 0.0).then(|| format!("{amount:.2}"));

    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Card Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="e.g. Travel card"
                value=(values.name)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="number" class=(FORM_LABEL_STYLE) { "Card Number" }

            input
                id="number"
                type="text"
                name="number"
                inputmode="numeric"
                autocomplete="off"
                value=(values.number)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="card_type" class=(FORM_LABEL_STYLE) { "Card Type" }

            select id="card_type" name="card_type" required class=(FORM_TEXT_INPUT_STYLE)
            {
                @for card_type in CardType::ALL {
                    option value=(card_type.as_str()) selected[values.card_type == card_type]
                    {
                        (card_type)
                    }
                }
            }
        }

        div class="grid gap-4 sm:grid-cols-2"
        {
            div
            {
                label for="balance" class=(FORM_LABEL_STYLE) { "Balance" }

                input
                    id="balance"
                    type="number"
                    name="balance"
                    step="0.01"
                    placeholder="0.00"
                    value=[optional_amount(values.balance)]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="spending_limit" class=(FORM_LABEL_STYLE) { "Spending Limit" }

                input
                    id="spending_limit"
                    type="number"
                    name="spending_limit"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    value=[optional_amount(values.spending_limit)]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="due_date" class=(FORM_LABEL_STYLE) { "Payment Due Date" }

            input
                id="due_date"
                type="date"
                name="due_date"
                value=[values.due_date]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        @if let Some(error_message) = error_message {
            p class=(FORM_ERROR_STYLE) { (error_message) }
        }
    }
}
