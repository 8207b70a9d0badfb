#![forbid(unsafe_code)]

//! `BindingLoc`: a binding whose resource key is translated and kept
//! current across culture and dictionary changes.
//!
//! # Lifecycle
//!
//! 1. [`BindingLoc::new`] installs a [`TranslateConverter`] into the wrapped
//!    binding and registers the adapter with the dictionary hub. The hub only
//!    holds a `Weak`.
//! 2. The host calls [`provide_value`](BindingLoc::provide_value). On the
//!    first call that names an element and property, the adapter records
//!    them and hands itself to the element via [`Element::retain`]; from then
//!    on the element is what keeps the adapter alive.
//! 3. Each dictionary event calls [`refresh`](BindingLoc::refresh): the
//!    element's [`BindingExpression`] for the property is looked up once,
//!    cached, and told to update its target.
//! 4. When the element is dropped the adapter goes with it and the hub's
//!    weak entry stops upgrading.
//!
//! # Failure Modes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Non-element context in `provide_value` | Target stays unresolved; refreshes return [`RefreshError::Unresolved`] |
//! | Event before `provide_value` | [`RefreshError::Unresolved`] |
//! | Element dropped while the adapter is still owned elsewhere | [`RefreshError::TargetDropped`] |
//! | Element has no binding on the property | [`RefreshError::NoExpression`], retried on the next event |
//!
//! From the hub these are logged at `debug` and the display is left as is.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::dictionary::{
    DictionaryEvent, DictionaryEventArgs, DictionaryEventListener, LocalizeDictionary,
};
use crate::error::RefreshError;
use crate::host::{
    Binding, BindingExpression, Element, PropertyId, ProvideValueTarget, ProvidedValue,
    ServiceProvider, TargetObject, ValueConverter,
};
use crate::translate::TranslateConverter;

struct ResolvedTarget {
    element: Weak<Element>,
    property: PropertyId,
}

/// Localizing binding adapter. One per markup usage.
///
/// ```
/// use lexbind_i18n::{LocaleStrings, StringCatalog};
/// use lexbind_runtime::{
///     Binding, BindingLoc, Element, LocalizeDictionary, Observable, PropertyId, ValueContext,
/// };
/// use std::rc::Rc;
///
/// let mut catalog = StringCatalog::new();
/// catalog.add_locale("en", [("Greeting", "Hello")].into_iter().collect::<LocaleStrings>());
/// catalog.add_locale("fr", [("Greeting", "Bonjour")].into_iter().collect::<LocaleStrings>());
/// let dictionary = Rc::new(LocalizeDictionary::new(Rc::new(catalog), "en").unwrap());
///
/// let key = Observable::new("Greeting".to_string());
/// let label = Element::new("greeting-label");
/// let adapter = BindingLoc::with_dictionary(Binding::new(&key), &dictionary);
/// adapter.provide_value(&ValueContext::for_element(&label, PropertyId::TEXT));
/// assert_eq!(label.get(PropertyId::TEXT).as_deref(), Some("Hello"));
///
/// dictionary.set_culture("fr").unwrap();
/// assert_eq!(label.get(PropertyId::TEXT).as_deref(), Some("Bonjour"));
/// ```
pub struct BindingLoc {
    binding: Binding,
    target: RefCell<Option<ResolvedTarget>>,
    expression: RefCell<Option<Rc<BindingExpression>>>,
    resolutions: Cell<u64>,
}

impl fmt::Debug for BindingLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingLoc")
            .field("binding", &self.binding)
            .field("target_property", &self.target_property())
            .field("has_refresh_handle", &self.has_refresh_handle())
            .field("resolutions", &self.resolutions.get())
            .finish()
    }
}

impl BindingLoc {
    /// Wrap `binding`, translating through the shared dictionary.
    #[must_use]
    pub fn new(binding: Binding) -> Rc<Self> {
        Self::with_dictionary(binding, &LocalizeDictionary::instance())
    }

    /// Wrap `binding`, translating through and listening to `dictionary`.
    #[must_use]
    pub fn with_dictionary(binding: Binding, dictionary: &Rc<LocalizeDictionary>) -> Rc<Self> {
        let converter = Rc::new(TranslateConverter::new(Rc::clone(dictionary)));
        Self::with_converter(binding, converter, dictionary.event())
    }

    /// Wrap `binding` with a caller-supplied converter, listening to `hub`.
    #[must_use]
    pub fn with_converter(
        mut binding: Binding,
        converter: Rc<dyn ValueConverter>,
        hub: &DictionaryEvent,
    ) -> Rc<Self> {
        binding.set_converter(converter);
        let adapter = Rc::new(Self {
            binding,
            target: RefCell::new(None),
            expression: RefCell::new(None),
            resolutions: Cell::new(0),
        });
        hub.add_listener(&adapter);
        adapter
    }

    /// Capture the target on first use, then materialize the binding.
    ///
    /// The return value is whatever the wrapped binding produces; it carries
    /// the initial display value. Later values arrive through
    /// [`refresh`](Self::refresh).
    pub fn provide_value(self: &Rc<Self>, ctx: &dyn ServiceProvider) -> ProvidedValue {
        if self.target.borrow().is_none() {
            self.resolve_target(ctx);
        }
        self.binding.provide_value(ctx)
    }

    fn resolve_target(self: &Rc<Self>, ctx: &dyn ServiceProvider) {
        match ctx.provide_value_target() {
            Some(ProvideValueTarget {
                object: TargetObject::Element(element),
                property: Some(property),
            }) => {
                debug!(element = element.name(), property = %property, "binding target resolved");
                *self.target.borrow_mut() = Some(ResolvedTarget {
                    element: Rc::downgrade(&element),
                    property,
                });
                let companion = Rc::clone(self) as Rc<dyn Any>;
                element.retain(companion);
            }
            Some(ProvideValueTarget {
                object: TargetObject::Shared(kind),
                ..
            }) => debug!(kind, "shared target; binding will not refresh"),
            Some(ProvideValueTarget { property: None, .. }) => {
                debug!("target property unknown; binding will not refresh");
            }
            None => debug!("no provide-value target; binding will not refresh"),
        }
    }

    /// Re-pull and redisplay the bound value.
    ///
    /// # Errors
    ///
    /// See the module-level failure table. No error leaves the display in a
    /// changed state.
    pub fn refresh(&self) -> Result<(), RefreshError> {
        self.refresh_handle()?.update_target()
    }

    fn refresh_handle(&self) -> Result<Rc<BindingExpression>, RefreshError> {
        if let Some(expression) = self.expression.borrow().as_ref() {
            return Ok(Rc::clone(expression));
        }

        let (element, property) = {
            let target = self.target.borrow();
            let target = target.as_ref().ok_or(RefreshError::Unresolved)?;
            let element = target.element.upgrade().ok_or(RefreshError::TargetDropped)?;
            (element, target.property)
        };

        self.resolutions.set(self.resolutions.get() + 1);
        let expression = element
            .binding_expression(property)
            .ok_or(RefreshError::NoExpression(property))?;
        *self.expression.borrow_mut() = Some(Rc::clone(&expression));
        Ok(expression)
    }

    /// Whether `provide_value` captured an element and property.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.target.borrow().is_some()
    }

    #[must_use]
    pub fn target_property(&self) -> Option<PropertyId> {
        self.target.borrow().as_ref().map(|t| t.property)
    }

    /// The captured element, if it is still alive.
    #[must_use]
    pub fn target_element(&self) -> Option<Rc<Element>> {
        self.target
            .borrow()
            .as_ref()
            .and_then(|t| t.element.upgrade())
    }

    #[must_use]
    pub fn has_refresh_handle(&self) -> bool {
        self.expression.borrow().is_some()
    }

    /// Number of refresh-handle lookups performed against the element.
    #[must_use]
    pub fn resolution_count(&self) -> u64 {
        self.resolutions.get()
    }

    #[must_use]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl DictionaryEventListener for BindingLoc {
    fn resource_changed(&self, _sender: &dyn Any, args: &DictionaryEventArgs) {
        match self.refresh() {
            Ok(()) => trace!(kind = args.kind.as_str(), "binding refreshed"),
            Err(err) => debug!(kind = args.kind.as_str(), error = %err, "binding refresh skipped"),
        }
    }
}
