#![forbid(unsafe_code)]

//! Minimal host binding model.
//!
//! The adapter only needs a few things from a UI framework: a way to learn
//! which element and property a markup usage configures
//! ([`ServiceProvider`]), a binding that can materialize itself
//! ([`Binding::provide_value`]), and a per-element handle that re-pulls and
//! redisplays the bound value ([`BindingExpression::update_target`]). This
//! module defines those seams and a small in-process implementation of them.
//!
//! # Ownership
//!
//! ```text
//! Element ──► BindingExpression ──► Observable (source), converter
//!    │              ▲
//!    └──► retained companions (e.g. BindingLoc) ──┘ cached handle
//! ```
//!
//! Every back edge (`BindingExpression → Element`, subscription callback →
//! `BindingExpression`) is `Weak`, so dropping the element releases the
//! whole graph.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::error::RefreshError;
use crate::reactive::{Observable, Subscription};

/// Identifier of a displayable element property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId(&'static str);

impl PropertyId {
    pub const TEXT: Self = Self("Text");
    pub const TOOL_TIP: Self = Self("ToolTip");
    pub const HEADER: Self = Self("Header");

    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A UI element with a string property store.
pub struct Element {
    name: String,
    values: RefCell<HashMap<PropertyId, String>>,
    expressions: RefCell<HashMap<PropertyId, Rc<BindingExpression>>>,
    retained: RefCell<Vec<Rc<dyn Any>>>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name)
            .field("values", &*self.values.borrow())
            .field("bound", &self.expressions.borrow().len())
            .field("retained", &self.retained.borrow().len())
            .finish()
    }
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            values: RefCell::new(HashMap::new()),
            expressions: RefCell::new(HashMap::new()),
            retained: RefCell::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current displayed value of `property`.
    #[must_use]
    pub fn get(&self, property: PropertyId) -> Option<String> {
        self.values.borrow().get(&property).cloned()
    }

    pub fn set(&self, property: PropertyId, value: impl Into<String>) {
        self.values.borrow_mut().insert(property, value.into());
    }

    /// The live binding for `property`, if one is attached.
    #[must_use]
    pub fn binding_expression(&self, property: PropertyId) -> Option<Rc<BindingExpression>> {
        self.expressions.borrow().get(&property).cloned()
    }

    /// Attach `expression` to `property`, replacing any previous binding.
    pub fn set_binding_expression(&self, property: PropertyId, expression: Rc<BindingExpression>) {
        let previous = self.expressions.borrow_mut().insert(property, expression);
        drop(previous);
    }

    /// Detach the binding for `property`. The displayed value stays.
    pub fn clear_binding(&self, property: PropertyId) -> Option<Rc<BindingExpression>> {
        self.expressions.borrow_mut().remove(&property)
    }

    /// Keep `companion` alive for as long as this element lives.
    pub fn retain(&self, companion: Rc<dyn Any>) {
        self.retained.borrow_mut().push(companion);
    }

    #[must_use]
    pub fn retained_count(&self) -> usize {
        self.retained.borrow().len()
    }
}

/// The object a markup usage is being applied to.
#[derive(Debug, Clone)]
pub enum TargetObject {
    /// A live element.
    Element(Rc<Element>),
    /// A shared, non-element target such as a template or style setter.
    Shared(&'static str),
}

/// Answer to "what is being configured right now?".
#[derive(Debug, Clone)]
pub struct ProvideValueTarget {
    pub object: TargetObject,
    pub property: Option<PropertyId>,
}

/// Context handed to `provide_value` by the host.
pub trait ServiceProvider {
    /// The target being configured, if the host can tell.
    fn provide_value_target(&self) -> Option<ProvideValueTarget>;
}

/// Stock [`ServiceProvider`].
#[derive(Debug, Clone, Default)]
pub struct ValueContext {
    target: Option<ProvideValueTarget>,
}

impl ValueContext {
    /// Context for binding `property` on `element`.
    #[must_use]
    pub fn for_element(element: &Rc<Element>, property: PropertyId) -> Self {
        Self {
            target: Some(ProvideValueTarget {
                object: TargetObject::Element(Rc::clone(element)),
                property: Some(property),
            }),
        }
    }

    /// Context for a shared, non-element target.
    #[must_use]
    pub fn shared(kind: &'static str, property: Option<PropertyId>) -> Self {
        Self {
            target: Some(ProvideValueTarget {
                object: TargetObject::Shared(kind),
                property,
            }),
        }
    }

    /// Context that knows nothing about its target.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ServiceProvider for ValueContext {
    fn provide_value_target(&self) -> Option<ProvideValueTarget> {
        self.target.clone()
    }
}

/// Turns a bound source value into display text.
pub trait ValueConverter {
    fn convert(&self, value: &str) -> String;
}

/// A converter backed by a closure.
pub struct FnConverter<F> {
    convert: F,
}

impl<F> ValueConverter for FnConverter<F>
where
    F: Fn(&str) -> String,
{
    fn convert(&self, value: &str) -> String {
        (self.convert)(value)
    }
}

/// Wrap a closure as a [`ValueConverter`].
pub fn converter_fn<F>(convert: F) -> FnConverter<F>
where
    F: Fn(&str) -> String,
{
    FnConverter { convert }
}

/// Binding descriptor: a view-model source plus an optional converter.
#[derive(Clone)]
pub struct Binding {
    source: Observable<String>,
    converter: Option<Rc<dyn ValueConverter>>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("source", &self.source)
            .field("has_converter", &self.converter.is_some())
            .finish()
    }
}

/// What [`Binding::provide_value`] produced.
#[derive(Debug, Clone)]
pub enum ProvidedValue {
    /// Attached to a live element; the element already shows the value.
    Expression(Rc<BindingExpression>),
    /// No element to attach to; the host re-applies the binding later.
    Binding(Binding),
}

impl ProvidedValue {
    #[must_use]
    pub fn expression(&self) -> Option<&Rc<BindingExpression>> {
        match self {
            Self::Expression(expr) => Some(expr),
            Self::Binding(_) => None,
        }
    }

    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Binding(_))
    }
}

impl Binding {
    #[must_use]
    pub fn new(source: &Observable<String>) -> Self {
        Self {
            source: source.clone(),
            converter: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> &Observable<String> {
        &self.source
    }

    #[must_use]
    pub fn converter(&self) -> Option<&Rc<dyn ValueConverter>> {
        self.converter.as_ref()
    }

    pub fn set_converter(&mut self, converter: Rc<dyn ValueConverter>) {
        self.converter = Some(converter);
    }

    /// Materialize the binding against the context's target.
    ///
    /// With an element and a property, attaches a new [`BindingExpression`]
    /// to the element and shows the initial value. Otherwise hands back a
    /// copy of the binding unchanged.
    pub fn provide_value(&self, ctx: &dyn ServiceProvider) -> ProvidedValue {
        match ctx.provide_value_target() {
            Some(ProvideValueTarget {
                object: TargetObject::Element(element),
                property: Some(property),
            }) => ProvidedValue::Expression(BindingExpression::attach(self, &element, property)),
            _ => ProvidedValue::Binding(self.clone()),
        }
    }
}

/// A binding established on one element property: the refresh handle.
pub struct BindingExpression {
    target: Weak<Element>,
    property: PropertyId,
    source: Observable<String>,
    converter: Option<Rc<dyn ValueConverter>>,
    updates: Cell<u64>,
    _source_changed: Subscription,
}

impl fmt::Debug for BindingExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingExpression")
            .field("property", &self.property)
            .field("target_alive", &(self.target.strong_count() > 0))
            .field("updates", &self.updates.get())
            .finish_non_exhaustive()
    }
}

impl BindingExpression {
    fn attach(binding: &Binding, element: &Rc<Element>, property: PropertyId) -> Rc<Self> {
        let expression = Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let source_changed = binding.source.subscribe(move |key: &String| {
                if let Some(expression) = weak.upgrade()
                    && let Err(err) = expression.update_target()
                {
                    debug!(key = %key, error = %err, "source change not applied");
                }
            });
            Self {
                target: Rc::downgrade(element),
                property,
                source: binding.source.clone(),
                converter: binding.converter.clone(),
                updates: Cell::new(0),
                _source_changed: source_changed,
            }
        });
        element.set_binding_expression(property, Rc::clone(&expression));
        if let Err(err) = expression.update_target() {
            debug!(property = %property, error = %err, "initial value not applied");
        }
        expression
    }

    /// Re-read the source, convert it and write it to the target property.
    ///
    /// # Errors
    ///
    /// [`RefreshError::TargetDropped`] if the element no longer exists.
    pub fn update_target(&self) -> Result<(), RefreshError> {
        let element = self.target.upgrade().ok_or(RefreshError::TargetDropped)?;
        let value = self.source.get();
        let text = match &self.converter {
            Some(converter) => converter.convert(&value),
            None => value,
        };
        trace!(element = element.name(), property = %self.property, text = %text, "update target");
        element.set(self.property, text);
        self.updates.set(self.updates.get() + 1);
        Ok(())
    }

    #[must_use]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    #[must_use]
    pub fn target(&self) -> Option<Rc<Element>> {
        self.target.upgrade()
    }

    /// Number of successful [`update_target`](Self::update_target) calls.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.updates.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> Rc<dyn ValueConverter> {
        Rc::new(converter_fn(|v: &str| v.to_uppercase()))
    }

    #[test]
    fn element_target_gets_expression_and_initial_value() {
        let key = Observable::new("hello".to_string());
        let mut binding = Binding::new(&key);
        binding.set_converter(upper());
        let label = Element::new("label");

        let provided = binding.provide_value(&ValueContext::for_element(&label, PropertyId::TEXT));
        let expr = provided.expression().expect("element target yields an expression");
        assert_eq!(label.get(PropertyId::TEXT).as_deref(), Some("HELLO"));
        assert_eq!(expr.update_count(), 1);
        assert!(Rc::ptr_eq(
            expr,
            &label.binding_expression(PropertyId::TEXT).expect("attached")
        ));
    }

    #[test]
    fn shared_target_defers() {
        let key = Observable::new("k".to_string());
        let binding = Binding::new(&key);
        assert!(binding.provide_value(&ValueContext::shared("template", Some(PropertyId::TEXT))).is_deferred());
        assert!(binding.provide_value(&ValueContext::empty()).is_deferred());
    }

    #[test]
    fn element_without_property_defers() {
        let key = Observable::new("k".to_string());
        let label = Element::new("label");
        let ctx = ValueContext {
            target: Some(ProvideValueTarget {
                object: TargetObject::Element(Rc::clone(&label)),
                property: None,
            }),
        };
        assert!(Binding::new(&key).provide_value(&ctx).is_deferred());
        assert!(label.binding_expression(PropertyId::TEXT).is_none());
    }

    #[test]
    fn source_change_updates_target() {
        let key = Observable::new("a".to_string());
        let label = Element::new("label");
        Binding::new(&key).provide_value(&ValueContext::for_element(&label, PropertyId::TEXT));

        key.set("b".to_string());
        assert_eq!(label.get(PropertyId::TEXT).as_deref(), Some("b"));
    }

    #[test]
    fn cleared_binding_stops_following_source() {
        let key = Observable::new("a".to_string());
        let label = Element::new("label");
        let provided =
            Binding::new(&key).provide_value(&ValueContext::for_element(&label, PropertyId::TEXT));
        drop(provided);
        assert!(label.clear_binding(PropertyId::TEXT).is_some());

        key.set("b".to_string());
        assert_eq!(label.get(PropertyId::TEXT).as_deref(), Some("a"));
        assert_eq!(key.subscriber_count(), 0);
    }

    #[test]
    fn update_after_element_drop_reports_target_dropped() {
        let key = Observable::new("a".to_string());
        let label = Element::new("label");
        let provided =
            Binding::new(&key).provide_value(&ValueContext::for_element(&label, PropertyId::TEXT));
        let expr = Rc::clone(provided.expression().expect("expression"));
        drop(provided);
        drop(label);

        assert_eq!(expr.update_target(), Err(RefreshError::TargetDropped));
        assert!(expr.target().is_none());
    }

    #[test]
    fn retain_keeps_companion_alive() {
        let label = Element::new("label");
        let companion: Rc<dyn Any> = Rc::new(42u32);
        let weak = Rc::downgrade(&companion);
        label.retain(companion);
        assert_eq!(label.retained_count(), 1);
        assert!(weak.upgrade().is_some());
        drop(label);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn property_id_display() {
        assert_eq!(PropertyId::TOOL_TIP.to_string(), "ToolTip");
        assert_eq!(PropertyId::new("Title").name(), "Title");
    }
}
