//! The form fields shared by the new and edit transaction pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    card::Card,
    database_id::CardId,
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    transaction::{
        RecurrenceFrequency, Transaction, TransactionBuilder, TransactionType,
        domain::{CASH_PAYMENT_METHOD, INCOME_CATEGORIES, INCOME_SOURCES},
    },
};

/// The form data for creating or updating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    pub type_: TransactionType,
    /// The value of the transaction, always positive.
    pub amount: f64,
    pub date: Date,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub card_id: Option<CardId>,
    /// Set to "true" when the recurring checkbox is ticked.
    #[serde(default)]
    pub is_recurring: Option<String>,
    #[serde(default)]
    pub recurrence_frequency: Option<RecurrenceFrequency>,
}

impl From<TransactionForm> for TransactionBuilder {
    fn from(form: TransactionForm) -> Self {
        let builder = Transaction::build(form.type_, form.amount, form.date, &form.category)
            .description(&form.description)
            .payment_method(&form.payment_method)
            .card_id(form.card_id);

        if form.is_recurring.is_some() {
            builder.recurring(form.recurrence_frequency)
        } else {
            builder
        }
    }
}

impl From<&Transaction> for TransactionBuilder {
    fn from(transaction: &Transaction) -> Self {
        TransactionBuilder {
            type_: transaction.type_,
            amount: transaction.amount,
            date: transaction.date,
            description: transaction.description.clone(),
            category: transaction.category.clone(),
            payment_method: transaction.payment_method.clone(),
            card_id: transaction.card_id,
            is_recurring: transaction.is_recurring,
            recurrence_frequency: transaction.recurrence_frequency,
        }
    }
}

fn type_radio(value: TransactionType, checked: bool) -> Markup {
    let id = format!("transaction-type-{}", value.as_str());

    html! {
        div class="flex items-center gap-3"
        {
            input
                name="type_"
                id=(id)
                type="radio"
                value=(value.as_str())
                checked[checked]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (value) }
        }
    }
}

/// Render the inputs for a transaction, pre-filled from `values`.
///
/// An amount of zero or less leaves the amount input empty. Income gets
/// suggestions for common categories and sources, expenses get a card picker.
pub fn transaction_form_fields(
    values: &TransactionBuilder,
    cards: &[Card],
    error_message: Option<&str>,
) -> Markup {
    let is_income = values.type_ == TransactionType::Income;
    let amount = (values.amount > 0.0).then(|| format!("{:.2}", values.amount));
    let (category_label, payment_label) = if is_income {
        ("Category", "Source")
    } else {
        ("Category", "Payment Method")
    };

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                (type_radio(TransactionType::Expense, !is_income))
                (type_radio(TransactionType::Income, is_income))
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                required
                autofocus
                value=[amount]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(values.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { (category_label) }

            input
                name="category"
                id="category"
                type="text"
                placeholder="e.g. Groceries"
                value=(values.category)
                required
                list=[is_income.then_some("income-categories")]
                class=(FORM_TEXT_INPUT_STYLE);

            @if is_income {
                datalist id="income-categories"
                {
                    @for category in INCOME_CATEGORIES {
                        option value=(category) {}
                    }
                }
            }
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=(values.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="payment_method" class=(FORM_LABEL_STYLE) { (payment_label) }

            input
                name="payment_method"
                id="payment_method"
                type="text"
                placeholder=(CASH_PAYMENT_METHOD)
                value=(values.payment_method)
                list=[is_income.then_some("income-sources")]
                class=(FORM_TEXT_INPUT_STYLE);

            @if is_income {
                datalist id="income-sources"
                {
                    @for source in INCOME_SOURCES {
                        option value=(source) {}
                    }
                }
            }
        }

        @if !is_income && !cards.is_empty() {
            div
            {
                label for="card_id" class=(FORM_LABEL_STYLE) { "Card" }

                select name="card_id" id="card_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No card" }

                    @for card in cards {
                        option value=(card.id) selected[values.card_id == Some(card.id)]
                        {
                            (card.name) " •••• " (card.last_four())
                        }
                    }
                }
            }
        }

        div class="flex items-center gap-2"
        {
            input
                name="is_recurring"
                id="is_recurring"
                type="checkbox"
                value="true"
                checked[values.is_recurring];

            label for="is_recurring" class="text-sm text-gray-900 dark:text-white" { "Recurring" }
        }

        div
        {
            label for="recurrence_frequency" class=(FORM_LABEL_STYLE) { "Repeats" }

            select name="recurrence_frequency" id="recurrence_frequency" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Does not repeat" }

                @for frequency in RecurrenceFrequency::ALL {
                    option
                        value=(frequency.as_str())
                        selected[values.recurrence_frequency == Some(frequency)]
                    {
                        (frequency)
                    }
                }
            }
        }

        @if let Some(error_message) = error_message {
            p class=(FORM_ERROR_STYLE) { (error_message) }
        }
    }
}
