//! The form fields shared by the new and edit goal pages.

use maud::{Markup, html};

use crate::{
    goal::{GoalBuilder, SavingsFrequency},
    html::{FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// Render the inputs for a goal, pre-filled from `values`.
pub fn goal_form_fields(values: &GoalBuilder, error_message: Option<&str>) -> Markup {
    let target_amount =
        (values.target_amount > 0.0).then(|| format!("{:.2}", values.target_amount));
    let start_amount = (values.start_amount > 0.0).then(|| format!("{:.2}", values.start_amount));

    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Goal Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="e.g. Holiday"
                value=(values.name)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div class="grid gap-4 sm:grid-cols-2"
        {
            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target Amount" }

                input
                    id="target_amount"
                    type="number"
                    name="target_amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    value=[target_amount]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="start_amount" class=(FORM_LABEL_STYLE) { "Already Saved" }

                input
                    id="start_amount"
                    type="number"
                    name="start_amount"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    value=[start_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div class="grid gap-4 sm:grid-cols-2"
        {
            div
            {
                label for="target_date" class=(FORM_LABEL_STYLE) { "Target Date" }

                input
                    id="target_date"
                    type="date"
                    name="target_date"
                    value=[values.target_date]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="frequency" class=(FORM_LABEL_STYLE) { "Saving Frequency" }

                select id="frequency" name="frequency" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[values.frequency.is_none()] { "Not set" }

                    @for frequency in SavingsFrequency::ALL {
                        option value=(frequency.as_str()) selected[values.frequency == Some(frequency)]
                        {
                            (frequency)
                        }
                    }
                }
            }
        }

        @if let Some(error_message) = error_message {
            p class=(FORM_ERROR_STYLE) { (error_message) }
        }
    }
}
