#![forbid(unsafe_code)]

//! The localize dictionary: active culture, resource provider, change hub.
//!
//! # Lifecycle
//!
//! [`LocalizeDictionary::instance`] is the shared broadcast point of the
//! calling thread. It is created on first use from
//! [`LocalizeConfig::from_env`] and lives until that thread exits. Bindings
//! are `Rc`-based and UI-affine, so the UI thread's instance is the one they
//! share. Other threads get their own independent dictionary, culture, and
//! hub. Code that wants isolation (tests, previews) builds its own dictionary
//! with [`LocalizeDictionary::new`] and binds against it explicitly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lexbind_i18n::{I18nError, Locale, ResourceProvider, StringCatalog, normalize_tag};
use tracing::{debug, info};

use super::event::{DictionaryEvent, DictionaryEventArgs, DictionaryEventKind, NotifyReport};
use crate::config::{LocalizeConfig, MissingKeyPolicy};

thread_local! {
    static INSTANCE: Rc<LocalizeDictionary> =
        Rc::new(LocalizeDictionary::from_config(&LocalizeConfig::from_env()));
}

/// Active culture plus the provider translations resolve against.
///
/// Every mutation that can change a translation broadcasts through
/// [`event`](Self::event).
pub struct LocalizeDictionary {
    culture: RefCell<Locale>,
    fallback: RefCell<Vec<Locale>>,
    provider: RefCell<Rc<dyn ResourceProvider>>,
    missing_key: Cell<MissingKeyPolicy>,
    event: DictionaryEvent,
}

impl std::fmt::Debug for LocalizeDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizeDictionary")
            .field("culture", &*self.culture.borrow())
            .field("fallback", &*self.fallback.borrow())
            .field("missing_key", &self.missing_key.get())
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

impl LocalizeDictionary {
    /// Create a dictionary serving `provider` in `culture`.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::InvalidLocale`] if `culture` is malformed.
    pub fn new(provider: Rc<dyn ResourceProvider>, culture: &str) -> Result<Self, I18nError> {
        Ok(Self {
            culture: RefCell::new(normalize_tag(culture)?),
            fallback: RefCell::new(Vec::new()),
            provider: RefCell::new(provider),
            missing_key: Cell::new(MissingKeyPolicy::default()),
            event: DictionaryEvent::new(),
        })
    }

    /// Create a dictionary from configuration, serving an empty catalog.
    ///
    /// Malformed fallback entries are skipped.
    #[must_use]
    pub fn from_config(config: &LocalizeConfig) -> Self {
        let fallback = config
            .fallback
            .iter()
            .filter_map(|tag| normalize_tag(tag).ok())
            .collect();
        Self {
            culture: RefCell::new(config.resolved_culture()),
            fallback: RefCell::new(fallback),
            provider: RefCell::new(Rc::new(StringCatalog::new())),
            missing_key: Cell::new(config.missing_key),
            event: DictionaryEvent::new(),
        }
    }

    /// The shared dictionary of the calling thread.
    ///
    /// The instance is per thread, not per process: each thread that calls
    /// this gets its own independent dictionary, culture and hub, and a
    /// culture switch on one thread is not seen by bindings on another.
    /// Bindings are `Rc`-based and stay on the UI thread, so in a normal
    /// application this is the one dictionary every binding shares.
    #[must_use]
    pub fn instance() -> Rc<Self> {
        INSTANCE.with(Rc::clone)
    }

    /// The change hub bindings register with.
    #[must_use]
    pub fn event(&self) -> &DictionaryEvent {
        &self.event
    }

    #[must_use]
    pub fn culture(&self) -> Locale {
        self.culture.borrow().clone()
    }

    /// Switch the active culture.
    ///
    /// Returns `Ok(false)` without notifying when the normalized tag equals
    /// the current culture.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::InvalidLocale`] if `tag` is malformed; the
    /// culture is left unchanged.
    pub fn set_culture(&self, tag: &str) -> Result<bool, I18nError> {
        let tag = normalize_tag(tag)?;
        let previous = {
            let mut culture = self.culture.borrow_mut();
            if *culture == tag {
                return Ok(false);
            }
            std::mem::replace(&mut *culture, tag.clone())
        };
        info!(from = %previous, to = %tag, "culture changed");
        self.broadcast(DictionaryEventArgs::new(DictionaryEventKind::CultureChanged).with_tag(tag));
        Ok(true)
    }

    /// Cultures tried, in order, after the active one misses.
    #[must_use]
    pub fn fallback(&self) -> Vec<Locale> {
        self.fallback.borrow().clone()
    }

    /// Replace the fallback cultures and refresh bindings.
    ///
    /// # Errors
    ///
    /// Returns the first malformed tag; nothing is changed in that case.
    pub fn set_fallback(&self, tags: &[&str]) -> Result<(), I18nError> {
        let normalized = tags
            .iter()
            .map(|tag| normalize_tag(tag))
            .collect::<Result<Vec<_>, _>>()?;
        *self.fallback.borrow_mut() = normalized;
        self.broadcast(DictionaryEventArgs::new(DictionaryEventKind::Refresh));
        Ok(())
    }

    #[must_use]
    pub fn provider(&self) -> Rc<dyn ResourceProvider> {
        Rc::clone(&self.provider.borrow())
    }

    /// Install a different resource provider.
    pub fn set_provider(&self, provider: Rc<dyn ResourceProvider>) -> NotifyReport {
        *self.provider.borrow_mut() = provider;
        self.broadcast(DictionaryEventArgs::new(DictionaryEventKind::ProviderChanged))
    }

    /// Install a string catalog as the provider.
    pub fn set_catalog(&self, catalog: StringCatalog) -> NotifyReport {
        self.set_provider(Rc::new(catalog))
    }

    /// Announce that the provider's data changed in place.
    pub fn resources_updated(&self) -> NotifyReport {
        self.broadcast(DictionaryEventArgs::new(DictionaryEventKind::ResourcesUpdated))
    }

    /// Ask every live binding to refresh.
    pub fn refresh(&self) -> NotifyReport {
        self.broadcast(DictionaryEventArgs::new(DictionaryEventKind::Refresh))
    }

    #[must_use]
    pub fn missing_key_policy(&self) -> MissingKeyPolicy {
        self.missing_key.get()
    }

    /// Change how misses render. Takes effect on the next refresh.
    pub fn set_missing_key_policy(&self, policy: MissingKeyPolicy) {
        self.missing_key.set(policy);
    }

    /// Resolve `key` in the active culture, then the fallback cultures.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        let provider = self.provider();
        let culture = self.culture();
        let fallback = self.fallback.borrow().clone();
        std::iter::once(&culture)
            .chain(fallback.iter().filter(|tag| **tag != culture))
            .find_map(|tag| provider.lookup(tag, key))
    }

    /// Resolve `key` for display, applying the missing-key policy on a miss.
    #[must_use]
    pub fn translate(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| {
            debug!(key, culture = %self.culture.borrow(), "missing resource");
            self.missing_key.get().render(key)
        })
    }

    fn broadcast(&self, args: DictionaryEventArgs) -> NotifyReport {
        self.event.notify(self, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::event::DictionaryEventListener;
    use lexbind_i18n::{LocaleStrings, from_fn};
    use std::any::Any;

    fn catalog() -> StringCatalog {
        let mut catalog = StringCatalog::new();
        catalog.add_locale(
            "en",
            [("Greeting", "Hello"), ("Farewell", "Goodbye")]
                .into_iter()
                .collect::<LocaleStrings>(),
        );
        catalog.add_locale("fr", [("Greeting", "Bonjour")].into_iter().collect::<LocaleStrings>());
        catalog
    }

    fn dictionary(culture: &str) -> LocalizeDictionary {
        LocalizeDictionary::new(Rc::new(catalog()), culture).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<DictionaryEventArgs>>,
        sender_was_dictionary: Cell<bool>,
    }

    impl DictionaryEventListener for Recorder {
        fn resource_changed(&self, sender: &dyn Any, args: &DictionaryEventArgs) {
            self.sender_was_dictionary
                .set(sender.downcast_ref::<LocalizeDictionary>().is_some());
            self.events.borrow_mut().push(args.clone());
        }
    }

    #[test]
    fn translate_follows_culture() {
        let dict = dictionary("en");
        assert_eq!(dict.translate("Greeting"), "Hello");
        dict.set_culture("fr").unwrap();
        assert_eq!(dict.translate("Greeting"), "Bonjour");
    }

    #[test]
    fn set_culture_notifies_with_tag() {
        let dict = dictionary("en");
        let recorder = Rc::new(Recorder::default());
        dict.event().add_listener(&recorder);

        assert_eq!(dict.set_culture("fr_FR.UTF-8"), Ok(true));
        assert_eq!(dict.culture(), "fr-FR");
        let events = recorder.events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DictionaryEventKind::CultureChanged);
        assert_eq!(events[0].tag.as_deref(), Some("fr-FR"));
        assert!(recorder.sender_was_dictionary.get());
    }

    #[test]
    fn unchanged_culture_does_not_notify() {
        let dict = dictionary("en-US");
        let recorder = Rc::new(Recorder::default());
        dict.event().add_listener(&recorder);
        assert_eq!(dict.set_culture("en_us"), Ok(false));
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn invalid_culture_is_rejected_and_kept() {
        let dict = dictionary("fr");
        assert!(matches!(dict.set_culture("C"), Err(I18nError::InvalidLocale(_))));
        assert_eq!(dict.culture(), "fr");
        assert!(LocalizeDictionary::new(Rc::new(catalog()), "").is_err());
    }

    #[test]
    fn fallback_cultures_apply_after_active() {
        let dict = LocalizeDictionary::new(
            Rc::new(from_fn(|locale, key| match (locale, key) {
                ("de", "Greeting") => Some("Hallo".into()),
                ("en", _) => Some(format!("en:{key}")),
                _ => None,
            })),
            "de",
        )
        .unwrap();
        assert_eq!(dict.translate("Farewell"), "Farewell");
        dict.set_fallback(&["en"]).unwrap();
        assert_eq!(dict.translate("Greeting"), "Hallo");
        assert_eq!(dict.translate("Farewell"), "en:Farewell");
        assert!(dict.set_fallback(&["en", "?"]).is_err());
        assert_eq!(dict.fallback(), vec!["en".to_string()]);
    }

    #[test]
    fn missing_key_policy_shapes_misses() {
        let dict = dictionary("en");
        assert_eq!(dict.translate("Nope"), "Nope");
        dict.set_missing_key_policy(MissingKeyPolicy::Marker);
        assert_eq!(dict.translate("Nope"), "[Nope]");
        dict.set_missing_key_policy(MissingKeyPolicy::Empty);
        assert_eq!(dict.translate("Nope"), "");
        assert_eq!(dict.lookup("Nope"), None);
    }

    #[test]
    fn provider_and_refresh_events() {
        let dict = dictionary("en");
        let recorder = Rc::new(Recorder::default());
        dict.event().add_listener(&recorder);

        let report = dict.set_catalog(StringCatalog::new());
        assert_eq!(report.delivered, 1);
        assert_eq!(dict.translate("Greeting"), "Greeting");
        dict.resources_updated();
        dict.refresh();

        let kinds: Vec<DictionaryEventKind> =
            recorder.events.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DictionaryEventKind::ProviderChanged,
                DictionaryEventKind::ResourcesUpdated,
                DictionaryEventKind::Refresh,
            ]
        );
    }

    #[test]
    fn from_config_uses_configured_values() {
        let config = LocalizeConfig {
            culture: Some("pt_BR".into()),
            fallback: vec!["en".into(), "not a tag".into()],
            missing_key: MissingKeyPolicy::Marker,
        };
        let dict = LocalizeDictionary::from_config(&config);
        assert_eq!(dict.culture(), "pt-BR");
        assert_eq!(dict.fallback(), vec!["en".to_string()]);
        assert_eq!(dict.missing_key_policy(), MissingKeyPolicy::Marker);
    }

    #[test]
    fn instance_is_shared_on_a_thread() {
        let a = LocalizeDictionary::instance();
        let b = LocalizeDictionary::instance();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn instance_is_independent_per_thread() {
        let main = LocalizeDictionary::instance();
        let before = main.culture();
        let other = if before == "ja" { "ko" } else { "ja" };

        let seen_on_worker = std::thread::spawn(move || {
            let worker = LocalizeDictionary::instance();
            worker.set_culture(other).expect("valid culture");
            worker.culture()
        })
        .join()
        .expect("worker thread");

        assert_eq!(seen_on_worker, other);
        assert_eq!(main.culture(), before);
    }
}
