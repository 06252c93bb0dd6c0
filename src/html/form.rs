//! Forms and the controls that can belong to them.
//!
//! Controls share three capabilities that do not line up with the
//! structural layers: belonging to a form, being labelled, and constraint
//! validation. Each is a trait with provided methods, implemented only by
//! the interfaces the host gives that capability.

use serde::Serialize;

use super::{invoke_related, related, related_all, AnyHtmlElement, HtmlElement};
use crate::collection;
use crate::error::Result;
use crate::host::{Handle, Value};
use crate::node::Node;
use crate::token_list::TokenList;

/// Controls with a form owner.
pub trait FormAssociated: HtmlElement {
    /// The owning form, by ancestry or by the `form` attribute.
    fn form(&self) -> Result<Option<HtmlFormElement>> {
        related(self.as_node(), "form")
    }
}

/// Controls a `<label>` can point at.
pub trait Labelable: HtmlElement {
    fn labels(&self) -> Result<Vec<HtmlLabelElement>> {
        related_all(self.as_node(), "labels")
    }
}

/// Controls taking part in constraint validation.
pub trait Validatable: HtmlElement {
    fn validity(&self) -> Result<ValidityState> {
        let state: Handle = self.as_node().read("validity")?;
        ValidityState::read_from(&state)
    }

    fn will_validate(&self) -> Result<bool> {
        self.as_node().read("willValidate")
    }

    fn validation_message(&self) -> Result<String> {
        self.as_node().read("validationMessage")
    }

    /// Fires `invalid` on the control when it fails.
    fn check_validity(&self) -> Result<bool> {
        self.as_node().invoke("checkValidity", &[])
    }

    /// An empty message clears the custom error.
    fn set_custom_validity(&self, message: &str) -> Result<()> {
        self.as_node().invoke("setCustomValidity", &[Value::from(message)])
    }
}

/// A copy of a control's `ValidityState` flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityState {
    pub bad_input: bool,
    pub custom_error: bool,
    pub pattern_mismatch: bool,
    pub range_overflow: bool,
    pub range_underflow: bool,
    pub step_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub type_mismatch: bool,
    pub valid: bool,
    pub value_missing: bool,
}

impl ValidityState {
    fn read_from(state: &Handle) -> Result<Self> {
        Ok(Self {
            bad_input: state.get_as("badInput")?,
            custom_error: state.get_as("customError")?,
            pattern_mismatch: state.get_as("patternMismatch")?,
            range_overflow: state.get_as("rangeOverflow")?,
            range_underflow: state.get_as("rangeUnderflow")?,
            step_mismatch: state.get_as("stepMismatch")?,
            too_long: state.get_as("tooLong")?,
            too_short: state.get_as("tooShort")?,
            type_mismatch: state.get_as("typeMismatch")?,
            valid: state.get_as("valid")?,
            value_missing: state.get_as("valueMissing")?,
        })
    }
}

html_element!(HtmlFormElement);

impl HtmlFormElement {
    /// The listed controls, as of now.
    pub fn elements(&self) -> Result<Vec<AnyHtmlElement>> {
        let node = self.as_node();
        collection::snapshot_html_elements(node.realm(), &node.read::<Value>("elements")?)
    }

    pub fn length(&self) -> Result<usize> {
        self.as_node().read("length")
    }

    pub fn item(&self, index: usize) -> Result<Option<AnyHtmlElement>> {
        let elements: Handle = self.as_node().read("elements")?;
        let value = elements.call("item", &[Value::from(index)])?;
        self.as_node().realm().wrap_html_element(&value)
    }

    pub fn named_item(&self, name: &str) -> Result<Option<AnyHtmlElement>> {
        let elements: Handle = self.as_node().read("elements")?;
        let value = elements.call("namedItem", &[Value::from(name)])?;
        self.as_node().realm().wrap_html_element(&value)
    }

    /// Submits without firing `submit`.
    pub fn submit(&self) -> Result<()> {
        self.as_node().invoke("submit", &[])
    }

    /// Fires a cancelable `submit` first.
    pub fn request_submit(&self) -> Result<()> {
        self.as_node().invoke("requestSubmit", &[])
    }

    pub fn reset(&self) -> Result<()> {
        self.as_node().invoke("reset", &[])
    }

    /// Checks every listed control.
    pub fn check_validity(&self) -> Result<bool> {
        self.as_node().invoke("checkValidity", &[])
    }

    reflect! {
        action / set_action: String = "action";
        autocomplete / set_autocomplete: String = "autocomplete";
        enctype / set_enctype: String = "enctype";
        method / set_method: String = "method";
        name / set_name: String = "name";
        no_validate / set_no_validate: bool = "noValidate";
        target / set_target: String = "target";
    }
}

html_element!(HtmlButtonElement);

impl HtmlButtonElement {
    reflect! {
        autofocus / set_autofocus: bool = "autofocus";
        disabled / set_disabled: bool = "disabled";
        form_no_validate / set_form_no_validate: bool = "formNoValidate";
        name / set_name: String = "name";
        button_type / set_button_type: String = "type";
        value / set_value: String = "value";
    }
}

impl FormAssociated for HtmlButtonElement {}
impl Labelable for HtmlButtonElement {}
impl Validatable for HtmlButtonElement {}

html_element!(HtmlDataListElement);

impl HtmlDataListElement {
    pub fn options(&self) -> Result<Vec<HtmlOptionElement>> {
        related_all(self.as_node(), "options")
    }
}

html_element!(HtmlFieldSetElement);

impl HtmlFieldSetElement {
    pub fn elements(&self) -> Result<Vec<AnyHtmlElement>> {
        let node = self.as_node();
        collection::snapshot_html_elements(node.realm(), &node.read::<Value>("elements")?)
    }

    reflect! {
        disabled / set_disabled: bool = "disabled";
        name / set_name: String = "name";
    }
}

impl FormAssociated for HtmlFieldSetElement {}
impl Validatable for HtmlFieldSetElement {}

html_element!(HtmlInputElement);

impl HtmlInputElement {
    /// The suggestions list named by the `list` attribute.
    pub fn list(&self) -> Result<Option<HtmlDataListElement>> {
        related(self.as_node(), "list")
    }

    reflect! {
        accept / set_accept: String = "accept";
        alt / set_alt: String = "alt";
        autocomplete / set_autocomplete: String = "autocomplete";
        autofocus / set_autofocus: bool = "autofocus";
        checked / set_checked: bool = "checked";
        default_checked: bool = "defaultChecked";
        default_value: String = "defaultValue";
        disabled / set_disabled: bool = "disabled";
        form_no_validate / set_form_no_validate: bool = "formNoValidate";
        max / set_max: String = "max";
        min / set_min: String = "min";
        multiple / set_multiple: bool = "multiple";
        name / set_name: String = "name";
        pattern / set_pattern: String = "pattern";
        placeholder / set_placeholder: String = "placeholder";
        read_only / set_read_only: bool = "readOnly";
        required / set_required: bool = "required";
        size / set_size: u32 = "size";
        src / set_src: String = "src";
        input_type / set_input_type: String = "type";
        value / set_value: String = "value";
    }
}

impl FormAssociated for HtmlInputElement {}
impl Labelable for HtmlInputElement {}
impl Validatable for HtmlInputElement {}

html_element!(HtmlKeygenElement);

impl HtmlKeygenElement {
    reflect! {
        autofocus / set_autofocus: bool = "autofocus";
        disabled / set_disabled: bool = "disabled";
        name / set_name: String = "name";
    }
}

impl FormAssociated for HtmlKeygenElement {}
impl Labelable for HtmlKeygenElement {}
impl Validatable for HtmlKeygenElement {}

html_element!(HtmlLabelElement);

impl HtmlLabelElement {
    /// The labelled control. Any labelable element may come back, so the
    /// result is not narrowed further.
    pub fn control(&self) -> Result<Option<AnyHtmlElement>> {
        related(self.as_node(), "control")
    }

    reflect! {
        html_for / set_html_for: String = "htmlFor";
    }
}

impl FormAssociated for HtmlLabelElement {}

html_element!(HtmlLegendElement);

impl FormAssociated for HtmlLegendElement {}

html_element!(HtmlMeterElement);

impl HtmlMeterElement {
    reflect! {
        high / set_high: f64 = "high";
        low / set_low: f64 = "low";
        max / set_max: f64 = "max";
        min / set_min: f64 = "min";
        optimum / set_optimum: f64 = "optimum";
    }
}

impl Labelable for HtmlMeterElement {}

html_element!(HtmlOptGroupElement);

impl HtmlOptGroupElement {
    reflect! {
        disabled / set_disabled: bool = "disabled";
        label / set_label: String = "label";
    }
}

html_element!(HtmlOptionElement);

impl HtmlOptionElement {
    /// Position among the owning select's options, 0 when there is none.
    pub fn index(&self) -> Result<usize> {
        self.as_node().read("index")
    }

    reflect! {
        default_selected: bool = "defaultSelected";
        disabled / set_disabled: bool = "disabled";
        label / set_label: String = "label";
        selected / set_selected: bool = "selected";
        text / set_text: String = "text";
        value / set_value: String = "value";
    }
}

impl FormAssociated for HtmlOptionElement {}

html_element!(HtmlOutputElement);

impl HtmlOutputElement {
    /// The ids this output is computed from. The host hands out a settable
    /// list, so the joined string goes through the list itself.
    pub fn html_for(&self) -> Result<TokenList> {
        TokenList::from_property(self.as_node(), "htmlFor", None)
    }

    reflect! {
        default_value: String = "defaultValue";
        name / set_name: String = "name";
        value / set_value: String = "value";
    }
}

impl FormAssociated for HtmlOutputElement {}
impl Labelable for HtmlOutputElement {}
impl Validatable for HtmlOutputElement {}

html_element!(HtmlProgressElement);

impl HtmlProgressElement {
    /// The current value as written. Absent means indeterminate.
    pub fn value(&self) -> Result<Option<f64>> {
        let raw: String = self.as_node().read("value")?;
        Ok(raw.trim().parse().ok())
    }

    reflect! {
        max / set_max: f64 = "max";
    }
}

impl Labelable for HtmlProgressElement {}

html_element!(HtmlSelectElement);

impl HtmlSelectElement {
    pub fn options(&self) -> Result<Vec<HtmlOptionElement>> {
        related_all(self.as_node(), "options")
    }

    pub fn selected_options(&self) -> Result<Vec<HtmlOptionElement>> {
        related_all(self.as_node(), "selectedOptions")
    }

    /// -1 when nothing is selected.
    pub fn selected_index(&self) -> Result<i32> {
        self.as_node().read("selectedIndex")
    }

    pub fn length(&self) -> Result<usize> {
        self.as_node().read("length")
    }

    pub fn item(&self, index: usize) -> Result<Option<HtmlOptionElement>> {
        invoke_related(self.as_node(), "item", &[Value::from(index)])
    }

    pub fn named_item(&self, name: &str) -> Result<Option<HtmlOptionElement>> {
        invoke_related(self.as_node(), "namedItem", &[Value::from(name)])
    }

    /// Insert `option` before `before`, or at the end.
    pub fn add(&self, option: &dyn HtmlElement, before: Option<&dyn HtmlElement>) -> Result<()> {
        let before = before
            .map(|element| Value::from(element.handle()))
            .unwrap_or(Value::Null);
        self.as_node()
            .invoke("add", &[Value::from(option.handle()), before])
    }

    /// Remove the option at `index`. Out of range is a no-op.
    pub fn remove_option(&self, index: usize) -> Result<()> {
        self.as_node().invoke("remove", &[Value::from(index)])
    }

    reflect! {
        autofocus / set_autofocus: bool = "autofocus";
        disabled / set_disabled: bool = "disabled";
        multiple / set_multiple: bool = "multiple";
        name / set_name: String = "name";
        required / set_required: bool = "required";
        select_type: String = "type";
        value / set_value: String = "value";
    }
}

impl FormAssociated for HtmlSelectElement {}
impl Labelable for HtmlSelectElement {}
impl Validatable for HtmlSelectElement {}

html_element!(HtmlTextAreaElement);

impl HtmlTextAreaElement {
    reflect! {
        autofocus / set_autofocus: bool = "autofocus";
        default_value: String = "defaultValue";
        disabled / set_disabled: bool = "disabled";
        name / set_name: String = "name";
        placeholder / set_placeholder: String = "placeholder";
        read_only / set_read_only: bool = "readOnly";
        required / set_required: bool = "required";
        value / set_value: String = "value";
        wrap / set_wrap: String = "wrap";
    }
}

impl FormAssociated for HtmlTextAreaElement {}
impl Labelable for HtmlTextAreaElement {}
impl Validatable for HtmlTextAreaElement {}
