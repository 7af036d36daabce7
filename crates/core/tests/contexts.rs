use canister_core::{Canister, CanisterError, Context, Key};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counted(canister: &Canister, key: &'static str, value: &'static str) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    canister.register(key, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(String::from(value))
    });
    calls
}

fn greeting(canister: &Canister) {
    canister.register("greeting", |c| {
        Ok(format!("hello {}", c.resolve::<String>("name")?))
    });
}

#[test]
fn override_shadows_then_reverts() {
    let canister = Canister::new();
    canister.register_value("name", String::from("world"));
    greeting(&canister);
    assert_eq!(*canister.resolve::<String>("greeting").unwrap(), "hello world");

    let inside = canister.with_override(|c| {
        c.register_value("name", String::from("test"));
        c.resolve::<String>("greeting").unwrap()
    });
    assert_eq!(*inside, "hello test");

    assert_eq!(canister.context_depth(), 1);
    assert!(canister.is_memoized("greeting"), "outer cache untouched");
    assert_eq!(*canister.resolve::<String>("greeting").unwrap(), "hello world");
}

#[test]
fn pushed_context_starts_cold() {
    let canister = Canister::new();
    let calls = counted(&canister, "config", "prod");
    canister.resolve::<String>("config").unwrap();

    canister.push_context();
    assert!(!canister.is_memoized("config"));
    assert_eq!(*canister.resolve::<String>("config").unwrap(), "prod");
    assert_eq!(calls.load(Ordering::SeqCst), 2, "override recomputes");
    canister.pop_context().unwrap();

    canister.resolve::<String>("config").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2, "base memo survived");
}

#[test]
fn registrations_inside_a_context_do_not_leak() {
    let canister = Canister::new();
    canister.register_value("base", 1u8);
    canister
        .push_context()
        .register_value("scoped", 2u8);
    assert_eq!(canister.keys(), vec![Key::from("base"), Key::from("scoped")]);

    canister.pop_context().unwrap();
    assert_eq!(canister.keys(), vec![Key::from("base")]);
    assert!(matches!(
        canister.resolve::<u8>("scoped"),
        Err(CanisterError::UnregisteredKey(_))
    ));
}

#[test]
fn push_context_from_uses_the_given_base() {
    let canister = Canister::new();
    canister.register_value("a", 1u8);

    canister.push_context_from(Context::new());
    assert!(canister.keys().is_empty());
    canister.pop_context().unwrap();

    let snapshot = canister.current_context().derive();
    canister.register_value("b", 2u8);
    canister.push_context_from(snapshot);
    assert_eq!(canister.keys(), vec![Key::from("a")]);
}

#[test]
fn popping_past_the_base_fails() {
    let canister = Canister::new();
    canister.push_context().push_context();
    canister.pop_context().unwrap().pop_context().unwrap();
    let err = canister.pop_context().unwrap_err();
    assert!(matches!(err, CanisterError::InvalidPop));
    assert_eq!(err.to_string(), "Cannot pop the base context");
}

#[test]
fn with_override_reverts_after_panic() {
    let canister = Canister::new();
    canister.register_value("mode", "prod");

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        canister.with_override(|c| {
            c.register_value("mode", "test");
            panic!("work failed");
        })
    }));
    assert!(outcome.is_err());
    assert_eq!(canister.context_depth(), 1);
    assert_eq!(*canister.resolve::<&str>("mode").unwrap(), "prod");
}

#[test]
fn nested_overrides_stack() {
    let canister = Canister::new();
    canister.register_value("level", 0u32);
    canister.with_override(|outer| {
        outer.register_value("level", 1u32);
        outer.with_override(|inner| {
            assert_eq!(*inner.resolve::<u32>("level").unwrap(), 1);
            inner.register_value("level", 2u32);
            assert_eq!(*inner.resolve::<u32>("level").unwrap(), 2);
            assert_eq!(inner.context_depth(), 3);
        });
        assert_eq!(*outer.resolve::<u32>("level").unwrap(), 1);
    });
    assert_eq!(*canister.resolve::<u32>("level").unwrap(), 0);
}

#[test]
fn resolution_stays_in_its_starting_context() {
    let canister = Canister::new();
    canister.register_value("name", String::from("base"));
    canister.register("greeting", |c| {
        // Switching the active context mid-flight must not redirect lookups.
        c.canister().push_context_from(Context::new());
        let name = c.resolve::<String>("name")?;
        c.canister().pop_context()?;
        Ok(format!("hello {name}"))
    });

    assert_eq!(*canister.resolve::<String>("greeting").unwrap(), "hello base");
    assert_eq!(canister.context_depth(), 1);
}
