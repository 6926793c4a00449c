//! The form fields shared by the new and edit budget pages.

use maud::{Markup, html};

use crate::{
    budget::BudgetBuilder,
    html::{FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// Render the inputs for a budget, pre-filled from `values`.
pub fn budget_form_fields(values: &BudgetBuilder, error_message: Option<&str>) -> Markup {
    let amount = (values.amount > 0.0).then(|| format!("{:.2}", values.amount));

    html! {
        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            input
                id="category"
                type="text"
                name="category"
                placeholder="e.g. Groceries"
                value=(values.category)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                id="amount"
                type="number"
                name="amount"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                value=[amount]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div class="grid gap-4 sm:grid-cols-2"
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "Start Date" }

                input
                    id="start_date"
                    type="date"
                    name="start_date"
                    value=(values.start_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "End Date" }

                input
                    id="end_date"
                    type="date"
                    name="end_date"
                    value=(values.end_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        @if let Some(error_message) = error_message {
            p class=(FORM_ERROR_STYLE) { (error_message) }
        }
    }
}
