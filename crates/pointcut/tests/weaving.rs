//! End-to-end weaving through the in-memory host.
//!
//! Join points and advice live in a [`MethodTable`]; calls go through
//! [`MethodTable::invoke`], the way code at the join point would reach them.

use std::sync::Arc;

use parking_lot::Mutex;
use pointcut::{
	AdviceBinding, Call, CallKind, Error, MethodTable, Object, ObjectRef, ObjectRegistry, Param,
	PointcutRegistry, SignatureDescriptor, TargetKey, Value, WeaveConfig,
};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct Test {
	hello: &'static str,
}

impl Object for Test {
	fn class(&self) -> &str {
		"Test"
	}
}

#[derive(Debug)]
struct TestObjectAspect {
	x: i64,
}

impl Object for TestObjectAspect {
	fn class(&self) -> &str {
		"TestObjectAspect"
	}
}

/// A host with `Test::say_moo` (returns 1) and a shared effect log.
struct Host {
	table: Arc<MethodTable>,
	pointcuts: PointcutRegistry,
	log: Arc<Mutex<Vec<String>>>,
}

impl Host {
	fn new() -> Self {
		Self::with_config(WeaveConfig::default())
	}

	fn with_config(config: WeaveConfig) -> Self {
		let table = Arc::new(MethodTable::new());
		let log: Arc<Mutex<Vec<String>>> = Arc::default();
		let l = log.clone();
		table.define(say_moo(), SignatureDescriptor::default(), move |_| {
			l.lock().push("moo".to_string());
			Ok(Value::Int(1))
		});
		let pointcuts = PointcutRegistry::with_config(table.clone(), table.clone(), config);
		Self {
			table,
			pointcuts,
			log,
		}
	}

	fn function(&self, name: &'static str, ret: Value) -> AdviceBinding {
		let l = self.log.clone();
		self.table
			.define(TargetKey::function(name), SignatureDescriptor::default(), move |_| {
				l.lock().push(name.to_string());
				Ok(ret.clone())
			});
		AdviceBinding::function(name)
	}

	fn call_moo(&self, on: ObjectRef) -> pointcut::Result<Value> {
		self.table.invoke(&say_moo(), &Call::on(on, []))
	}

	fn effects(&self) -> Vec<String> {
		std::mem::take(&mut *self.log.lock())
	}
}

fn say_moo() -> TargetKey {
	TargetKey::method("Test", "say_moo")
}

fn test_object() -> ObjectRef {
	Arc::new(Test { hello: "Hello" })
}

#[test]
fn resolution_is_idempotent() {
	let host = Host::new();
	let a = host.pointcuts.resolve(say_moo()).unwrap();
	let b = host.pointcuts.resolve(say_moo()).unwrap();
	assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn before_runs_first_and_preserves_return() {
	let host = Host::new();
	let b = host.function("b", Value::from("ignored"));
	host.pointcuts.resolve(say_moo()).unwrap().before(&b).unwrap();

	assert_eq!(host.call_moo(test_object()).unwrap(), Value::Int(1));
	assert_eq!(host.effects(), vec!["b", "moo"]);
}

#[test]
fn after_replaces_return_and_still_runs_original() {
	let host = Host::new();
	let a = host.function("a", Value::Int(2));
	host.pointcuts.resolve(say_moo()).unwrap().after(&a).unwrap();

	assert_eq!(host.call_moo(test_object()).unwrap(), Value::Int(2));
	assert_eq!(host.effects(), vec!["moo", "a"]);
}

#[test]
fn around_preserves_original_return() {
	let host = Host::new();
	let c = host.function("c", Value::Int(99));
	host.pointcuts.resolve(say_moo()).unwrap().around(&c).unwrap();

	assert_eq!(host.call_moo(test_object()).unwrap(), Value::Int(1));
	assert_eq!(host.effects(), vec!["moo", "c"]);
}

#[test]
fn after_then_before_composes_in_attachment_order() {
	let host = Host::new();
	let a = host.function("a", Value::Int(2));
	let b = host.function("b", Value::Null);
	let chain = host.pointcuts.resolve(say_moo()).unwrap();

	chain.after(&a).unwrap();
	assert_eq!(host.call_moo(test_object()).unwrap(), Value::Int(2));
	assert_eq!(host.effects(), vec!["moo", "a"]);

	chain.before(&b).unwrap();
	assert_eq!(host.call_moo(test_object()).unwrap(), Value::Int(2));
	assert_eq!(host.effects(), vec!["b", "moo", "a"]);
}

#[test]
fn wildcard_targets_are_unsupported() {
	let host = Host::new();
	for key in [TargetKey::method("*", "foo"), TargetKey::method("Foo", "*")] {
		assert_eq!(
			host.pointcuts.resolve(key.clone()).unwrap_err(),
			Error::Unsupported(key)
		);
	}
	assert!(host.pointcuts.is_empty());
}

#[test]
fn missing_target_and_missing_advice_fail_lookup() {
	let host = Host::new();
	let ghost = TargetKey::method("Test", "ghost");
	assert_eq!(host.pointcuts.resolve(ghost.clone()).unwrap_err(), Error::Lookup(ghost));

	let chain = host.pointcuts.resolve(say_moo()).unwrap();
	let err = chain.after(&AdviceBinding::function("ghost")).unwrap_err();
	assert_eq!(err, Error::Lookup(TargetKey::function("ghost")));
	// Nothing was installed; the join point still runs the original.
	assert!(host.table.installed(&say_moo()).is_none());
	assert_eq!(host.call_moo(test_object()).unwrap(), Value::Int(1));
}

#[test]
fn instance_advice_sees_its_own_state_from_any_call_site() {
	let host = Host::new();
	let seen = Arc::new(Mutex::new(None));
	let s = seen.clone();
	host.table.define(
		TargetKey::method("TestObjectAspect", "hello"),
		SignatureDescriptor::new([Param::new("that")]),
		move |call| {
			*s.lock() = call.this_as::<TestObjectAspect>().map(|a| a.x);
			Ok(Value::Null)
		},
	);

	let objects = ObjectRegistry::new();
	let chain = host.pointcuts.resolve(say_moo()).unwrap();
	{
		// The aspect object is only reachable through the registry afterwards.
		let advice = AdviceBinding::instance(&objects, Arc::new(TestObjectAspect { x: 5 }), "hello");
		chain.after(&advice).unwrap();
	}

	let caller = std::thread::spawn({
		let table = host.table.clone();
		move || table.invoke(&say_moo(), &Call::on(test_object(), []))
	});
	assert_eq!(caller.join().unwrap().unwrap(), Value::Null);
	assert_eq!(*seen.lock(), Some(5));
}

#[test]
fn receiver_injection_observes_the_join_point_receiver() {
	let host = Host::new();
	let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
	let s = seen.clone();
	host.table.define(
		TargetKey::method("TestStaticAspect", "hello"),
		SignatureDescriptor::new([Param::new("that"), Param::new("local").default("default")])
			.with_kind(CallKind::Static),
		move |call| {
			let that = call.arg(0);
			let hello = that
				.as_object()
				.and_then(|o| o.downcast_ref::<Test>())
				.map_or("?", |t| t.hello);
			s.lock().push((that.type_name().to_string(), format!("{hello} {}", call.arg(1).as_str().unwrap_or(""))));
			Ok(Value::Null)
		},
	);

	let aspect = AdviceBinding::method("TestStaticAspect", "hello");
	host.pointcuts
		.resolve(say_moo())
		.unwrap()
		.after(&aspect)
		.unwrap()
		.before(&aspect)
		.unwrap();

	let receiver = test_object();
	host.call_moo(receiver).unwrap();
	assert_eq!(
		*seen.lock(),
		vec![
			("Test".to_string(), "Hello default".to_string()),
			("Test".to_string(), "Hello default".to_string()),
		]
	);
}

#[test]
fn instance_advice_receives_caller_receiver_not_its_host() {
	let host = Host::new();
	let seen: Arc<Mutex<Vec<ObjectRef>>> = Arc::default();
	let s = seen.clone();
	host.table.define(
		TargetKey::method("TestObjectAspect", "hello"),
		SignatureDescriptor::new([Param::new("that")]),
		move |call| {
			if let Some(that) = call.arg(0).as_object() {
				s.lock().push(that.clone());
			}
			Ok(Value::Null)
		},
	);

	let objects = ObjectRegistry::new();
	let aspect: ObjectRef = Arc::new(TestObjectAspect { x: 5 });
	let advice = AdviceBinding::instance(&objects, aspect.clone(), "hello");
	host.pointcuts.resolve(say_moo()).unwrap().around(&advice).unwrap();

	let receiver = test_object();
	host.call_moo(receiver.clone()).unwrap();

	let seen = seen.lock();
	assert_eq!(seen.len(), 1);
	assert!(Arc::ptr_eq(&seen[0], &receiver));
	assert!(!Arc::ptr_eq(&seen[0], &aspect));
}

#[test]
fn receiver_slot_name_is_configurable() {
	let config = WeaveConfig::from_toml_str("receiver_slot = \"target\"").unwrap();
	let host = Host::with_config(config);
	let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
	let s = seen.clone();
	host.table.define(
		TargetKey::function("spy"),
		SignatureDescriptor::new([Param::new("target"), Param::new("that")]),
		move |call| {
			s.lock().extend(call.args().iter().cloned());
			Ok(Value::Null)
		},
	);
	host.pointcuts
		.resolve(say_moo())
		.unwrap()
		.before(&AdviceBinding::function("spy"))
		.unwrap();

	let receiver = test_object();
	host.call_moo(receiver.clone()).unwrap();
	assert_eq!(*seen.lock(), vec![Value::Object(receiver), Value::Null]);
}
