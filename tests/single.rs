mod custom_error;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use custom_error::CustomError;
use rxlite::{Disposable, Single, SingleSubscriber};

fn register_single() -> (SingleSubscriber<String>, Arc<Mutex<Vec<String>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_s = Arc::clone(&events);
    let events_e = Arc::clone(&events);
    let subscriber = SingleSubscriber::new(
        move |v| events_s.lock().unwrap().push(format!("success: {}", v)),
        move |e| events_e.lock().unwrap().push(format!("error: {}", e)),
    );
    (subscriber, events)
}

fn lookup(users: HashMap<u32, String>, id: u32) -> Single<String> {
    Single::create(move |mut emitter| match users.get(&id) {
        Some(name) => emitter.success(name.clone()),
        None => emitter.error(CustomError),
    })
}

#[test]
fn wraps_a_fallible_lookup() {
    let users = HashMap::from([(1, "ada".to_string())]);
    let (found, found_events) = register_single();
    let (missing, missing_events) = register_single();

    lookup(users.clone(), 1).subscribe(found);
    lookup(users, 2).subscribe(missing);

    assert_eq!(*found_events.lock().unwrap(), vec!["success: ada"]);
    assert_eq!(*missing_events.lock().unwrap(), vec!["error: Custom error occurred"]);
}

#[test]
fn success_after_error_has_no_effect() {
    let (subscriber, events) = register_single();

    let subscription = Single::create(|mut emitter| {
        emitter.error(CustomError);
        emitter.success("late".to_string());
    })
    .subscribe(subscriber);

    assert_eq!(*events.lock().unwrap(), vec!["error: Custom error occurred"]);
    assert!(subscription.is_disposed());
}

#[test]
fn just_and_error_factories() {
    let (ok, ok_events) = register_single();
    let (failed, failed_events) = register_single();

    Single::just("value".to_string()).subscribe(ok);
    Single::<String>::error(CustomError).subscribe(failed);

    assert_eq!(*ok_events.lock().unwrap(), vec!["success: value"]);
    assert_eq!(*failed_events.lock().unwrap(), vec!["error: Custom error occurred"]);
}

#[test]
fn defer_builds_a_fresh_single_per_subscription() {
    let mut counter = 0;
    let mut single = Single::defer(move || {
        counter += 1;
        Single::just(format!("call {}", counter))
    });
    let (first, first_events) = register_single();
    let (second, second_events) = register_single();

    single.subscribe(first);
    single.subscribe(second);

    assert_eq!(*first_events.lock().unwrap(), vec!["success: call 1"]);
    assert_eq!(*second_events.lock().unwrap(), vec!["success: call 2"]);
}

#[test]
fn missing_error_handler_does_not_panic() {
    let values = Arc::new(Mutex::new(Vec::new()));
    let values_c = Arc::clone(&values);

    let subscription = Single::<String>::error(CustomError)
        .subscribe(SingleSubscriber::on_success(move |v| values_c.lock().unwrap().push(v)));

    assert!(values.lock().unwrap().is_empty());
    assert!(subscription.is_disposed());
}
