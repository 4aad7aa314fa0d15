pub mod field_value;

pub use field_value::{FieldValue, parse_date_time};

use serde::{Deserialize, Serialize};

use crate::core::{FieldType, Result, Value};

/// Sort key used for fields that declare no explicit order.
pub const UNORDERED: i32 = i32::MAX;

pub const DEFAULT_PROVIDER_METHOD: &str = "list";

/// Presentation metadata attached to a single entity field.
///
/// Built by `#[derive(FormEntity)]` from `#[meta(...)]` attributes; screen
/// lines can override any attribute through [`MetaOverrides`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMeta {
    pub display_name: String,
    pub order: Option<i32>,
    pub hidden: bool,
    pub required: bool,
    pub read_only: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    /// `-1` means unbounded.
    pub max_length: i32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub width: Option<String>,
    pub use_radio_buttons: bool,
    pub allow_custom_value: bool,
    pub auto_select_first: bool,
    pub clear_on_empty_data: bool,
    pub combobox_read_only: bool,
    pub data_provider_bean: Option<String>,
    pub data_provider_method: String,
    pub data_provider_param_method: Option<String>,
    pub filter_method: Option<String>,
    pub data_provider_class: Option<String>,
}

impl Default for FieldMeta {
    fn default() -> Self {
        Self {
            display_name: "Field".to_string(),
            order: None,
            hidden: false,
            required: false,
            read_only: false,
            default_value: None,
            description: None,
            placeholder: None,
            max_length: -1,
            min: None,
            max: None,
            width: None,
            use_radio_buttons: false,
            allow_custom_value: false,
            auto_select_first: false,
            clear_on_empty_data: false,
            combobox_read_only: false,
            data_provider_bean: None,
            data_provider_method: DEFAULT_PROVIDER_METHOD.to_string(),
            data_provider_param_method: None,
            filter_method: None,
            data_provider_class: None,
        }
    }
}

impl FieldMeta {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn max_length(mut self, max_length: i32) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn use_radio_buttons(mut self, flag: bool) -> Self {
        self.use_radio_buttons = flag;
        self
    }

    pub fn allow_custom_value(mut self, flag: bool) -> Self {
        self.allow_custom_value = flag;
        self
    }

    pub fn auto_select_first(mut self, flag: bool) -> Self {
        self.auto_select_first = flag;
        self
    }

    pub fn clear_on_empty_data(mut self, flag: bool) -> Self {
        self.clear_on_empty_data = flag;
        self
    }

    pub fn combobox_read_only(mut self, flag: bool) -> Self {
        self.combobox_read_only = flag;
        self
    }

    pub fn data_provider_bean(mut self, bean: impl Into<String>) -> Self {
        self.data_provider_bean = Some(bean.into());
        self
    }

    pub fn data_provider_method(mut self, method: impl Into<String>) -> Self {
        self.data_provider_method = method.into();
        self
    }

    pub fn data_provider_param_method(mut self, method: impl Into<String>) -> Self {
        self.data_provider_param_method = Some(method.into());
        self
    }

    pub fn filter_method(mut self, method: impl Into<String>) -> Self {
        self.filter_method = Some(method.into());
        self
    }

    pub fn data_provider_class(mut self, class: impl Into<String>) -> Self {
        self.data_provider_class = Some(class.into());
        self
    }

    pub fn sort_key(&self) -> i32 {
        self.order.unwrap_or(UNORDERED)
    }

    /// Non-empty bean name, if any.
    pub fn provider_bean(&self) -> Option<&str> {
        non_empty(self.data_provider_bean.as_deref())
    }

    pub fn provider_class(&self) -> Option<&str> {
        non_empty(self.data_provider_class.as_deref())
    }

    pub fn has_data_provider(&self) -> bool {
        self.provider_bean().is_some() || self.provider_class().is_some()
    }

    pub fn default_text(&self) -> Option<&str> {
        non_empty(self.default_value.as_deref())
    }

    pub fn explicit_width(&self) -> Option<&str> {
        non_empty(self.width.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

macro_rules! overridable {
    ($($field:ident : $ty:ty),* $(,)?) => {
        /// Per-screen-line overrides. Every attribute left `None` keeps the
        /// field's own metadata.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct MetaOverrides {
            $(pub $field: Option<$ty>,)*
        }

        impl MetaOverrides {
            pub fn apply_to(&self, base: &FieldMeta) -> FieldMeta {
                let mut merged = base.clone();
                $(
                    if let Some(value) = &self.$field {
                        merged.$field = overridable!(@assign $field value);
                    }
                )*
                merged
            }

            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }
    };
    (@assign order $value:ident) => { Some(*$value) };
    (@assign min $value:ident) => { Some(*$value) };
    (@assign max $value:ident) => { Some(*$value) };
    (@assign default_value $value:ident) => { Some($value.clone()) };
    (@assign description $value:ident) => { Some($value.clone()) };
    (@assign placeholder $value:ident) => { Some($value.clone()) };
    (@assign width $value:ident) => { Some($value.clone()) };
    (@assign data_provider_bean $value:ident) => { Some($value.clone()) };
    (@assign data_provider_param_method $value:ident) => { Some($value.clone()) };
    (@assign filter_method $value:ident) => { Some($value.clone()) };
    (@assign data_provider_class $value:ident) => { Some($value.clone()) };
    (@assign $other:ident $value:ident) => { $value.clone() };
}

overridable! {
    display_name: String,
    order: i32,
    hidden: bool,
    required: bool,
    read_only: bool,
    default_value: String,
    description: String,
    placeholder: String,
    max_length: i32,
    min: f64,
    max: f64,
    width: String,
    use_radio_buttons: bool,
    allow_custom_value: bool,
    auto_select_first: bool,
    clear_on_empty_data: bool,
    combobox_read_only: bool,
    data_provider_bean: String,
    data_provider_method: String,
    data_provider_param_method: String,
    filter_method: String,
    data_provider_class: String,
}

/// Static description of one field, produced by `#[derive(FormEntity)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Entity that declares the field; differs from the described entity for
    /// fields inherited through `#[form(base)]`.
    pub declaring_entity: &'static str,
    pub field_type: FieldType,
    pub nullable: bool,
    pub meta: Option<FieldMeta>,
}

impl FieldDescriptor {
    pub fn new(
        name: &'static str,
        declaring_entity: &'static str,
        field_type: FieldType,
        nullable: bool,
    ) -> Self {
        Self {
            name,
            declaring_entity,
            field_type,
            nullable,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The declared metadata, or defaults captioned with the field name.
    pub fn effective_meta(&self) -> FieldMeta {
        self.meta
            .clone()
            .unwrap_or_else(|| FieldMeta::named(self.name))
    }

    pub fn is_visible(&self) -> bool {
        self.meta.as_ref().is_some_and(|meta| !meta.hidden)
    }
}

/// A model type whose fields the engine can discover, read and write.
///
/// Implemented by `#[derive(FormEntity)]`.
pub trait EntityModel: Sized + 'static {
    fn entity_name() -> &'static str;

    /// All described fields in discovery order, ancestors included.
    fn fields() -> &'static [FieldDescriptor];

    fn get_field(&self, name: &str) -> Result<Value>;

    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    /// Whether `value` would be accepted by `set_field(name, value)`.
    fn check_field(_name: &str, _value: &Value) -> Result<()> {
        Ok(())
    }

    fn display_text(&self) -> String;

    fn entity_id(&self) -> Option<i64> {
        None
    }

    fn color(&self) -> Option<String> {
        None
    }

    fn has_field(name: &str) -> bool {
        Self::fields().iter().any(|field| field.name == name)
    }
}

/// Metadata-carrying, non-hidden fields of `E`, stable-sorted by order.
pub fn ordered_visible_fields<E: EntityModel>() -> Vec<&'static FieldDescriptor> {
    let mut visible: Vec<&'static FieldDescriptor> =
        E::fields().iter().filter(|field| field.is_visible()).collect();
    visible.sort_by_key(|field| field.meta.as_ref().map_or(UNORDERED, FieldMeta::sort_key));
    visible
}

pub fn find_field<E: EntityModel>(name: &str) -> Option<&'static FieldDescriptor> {
    E::fields().iter().find(|field| field.name == name)
}
