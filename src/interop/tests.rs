//! Test suite for the interop module

use super::argument::*;
use super::list::convert_nodes;
use super::*;
use crate::config::MarshalConfig;
use crate::errors::ErrorKind;
use std::rc::Rc;

// Test helpers
struct Fixture {
    runtime: MemoryRuntime,
    color: HostClass,
    button: HostClass,
}

fn fixture() -> Fixture {
    let mut runtime = MemoryRuntime::new();
    let color = runtime.register_class(InterfaceInfo::structure("Gdk", "Color", GType(0x1000), 12));
    let button = runtime.register_class(InterfaceInfo::object("Gtk", "Button", GType(0x2000)));
    Fixture {
        runtime,
        color,
        button,
    }
}

fn orientation() -> TypeInfo {
    TypeInfo::interface(InterfaceInfo::enumeration("Gtk", "Orientation", GType(0x3000)))
}

fn integer_types() -> Vec<TypeInfo> {
    vec![
        TypeInfo::Int8,
        TypeInfo::UInt8,
        TypeInfo::Int16,
        TypeInfo::UInt16,
        TypeInfo::Int32,
        TypeInfo::UInt32,
        TypeInfo::Int64,
        TypeInfo::UInt64,
        TypeInfo::Short,
        TypeInfo::UShort,
        TypeInfo::Int,
        TypeInfo::UInt,
        TypeInfo::Long,
        TypeInfo::ULong,
        TypeInfo::SSize,
        TypeInfo::Size,
    ]
}

#[test]
fn test_integer_bounds_every_tag() {
    let fx = fixture();
    let rt = &fx.runtime;

    for ty in integer_types() {
        let (min, max) = ty.tag().integer_bounds().unwrap();

        assert!(check_representable(rt, &HostValue::Int(min), &ty).is_ok(), "{} min", ty);
        assert!(check_representable(rt, &HostValue::Int(max), &ty).is_ok(), "{} max", ty);

        for outside in [min - 1, max + 1] {
            let err = check_representable(rt, &HostValue::Int(outside), &ty).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Value, "{} {}", ty, outside);
            assert_eq!(err.message(), format!("Must range from {} to {}", min, max));
        }

        for bound in [min, max] {
            let argument = value_to_argument(rt, &HostValue::Int(bound), &ty).unwrap();
            let back = argument_to_value(rt, argument, &ty).unwrap();
            assert_eq!(back, HostValue::Int(bound), "{} round trip", ty);
        }
    }
}

#[test]
fn test_integer_check_is_nominal() {
    let fx = fixture();
    let err = check_representable(&fx.runtime, &HostValue::Float(1.0), &TypeInfo::Int32).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.message(), "Must be int or long, not float");
    assert_eq!(err.expected(), Some("int or long"));

    // Booleans are integers on the host
    assert!(check_representable(&fx.runtime, &HostValue::Bool(true), &TypeInfo::UInt8).is_ok());
}

#[test]
fn test_raw_path_narrows_natively() {
    let fx = fixture();
    let argument = value_to_argument(&fx.runtime, &HostValue::from(300), &TypeInfo::UInt8).unwrap();
    assert_eq!(argument, Argument::UInt8(44));

    let argument = value_to_argument(&fx.runtime, &HostValue::from(-1), &TypeInfo::UInt32).unwrap();
    assert_eq!(argument, Argument::UInt32(u32::MAX));

    let argument = value_to_argument(&fx.runtime, &HostValue::Float(7.9), &TypeInfo::Int16).unwrap();
    assert_eq!(argument, Argument::Int16(7));

    let err = value_to_argument(&fx.runtime, &HostValue::Float(f64::INFINITY), &TypeInfo::Int32).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.message(), "Cannot convert float inf to integer");
}

#[test]
fn test_boolean_and_void_always_accept() {
    let fx = fixture();
    for value in [HostValue::None, HostValue::from("x"), HostValue::tuple([])] {
        assert!(check_representable(&fx.runtime, &value, &TypeInfo::Boolean).is_ok());
        assert!(check_representable(&fx.runtime, &value, &TypeInfo::Void).is_ok());
    }

    let argument = value_to_argument(&fx.runtime, &HostValue::from("x"), &TypeInfo::Boolean).unwrap();
    assert_eq!(argument, Argument::Boolean(true));
    assert!(argument_to_value(&fx.runtime, Argument::Void, &TypeInfo::Void).unwrap().is_none());
}

#[test]
fn test_float_checks() {
    let fx = fixture();
    let rt = &fx.runtime;

    assert!(check_representable(rt, &HostValue::Float(1.25), &TypeInfo::Float).is_ok());
    assert!(check_representable(rt, &HostValue::Float(1e300), &TypeInfo::Double).is_ok());

    let err = check_representable(rt, &HostValue::Float(1e300), &TypeInfo::Float).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert!(err.message().starts_with("Must range from -"));

    assert!(check_representable(rt, &HostValue::Float(f64::NAN), &TypeInfo::Double).is_err());
    let err = check_representable(rt, &HostValue::from(1), &TypeInfo::Double).unwrap_err();
    assert_eq!(err.message(), "Must be float, not int");

    let argument = value_to_argument(rt, &HostValue::Float(1.25), &TypeInfo::Float).unwrap();
    assert_eq!(argument_to_value(rt, argument, &TypeInfo::Float).unwrap(), HostValue::Float(1.25));
}

#[test]
fn test_string_conversions() {
    let fx = fixture();
    let rt = &fx.runtime;

    let err = check_representable(rt, &HostValue::from(5), &TypeInfo::Utf8).unwrap_err();
    assert_eq!(err.message(), "Must be string, not int");

    let argument = value_to_argument(rt, &HostValue::from("héllo"), &TypeInfo::Utf8).unwrap();
    match &argument {
        Argument::Pointer(pointer @ Pointer::Owned(s)) => {
            assert!(pointer.is_owned());
            assert_eq!(s.to_str().unwrap(), "héllo");
        }
        other => panic!("expected an owned string, got {:?}", other),
    }
    assert_eq!(argument_to_value(rt, argument, &TypeInfo::Utf8).unwrap(), HostValue::from("héllo"));

    assert!(value_to_argument(rt, &HostValue::None, &TypeInfo::Utf8).unwrap().is_null());
    assert!(argument_to_value(rt, Argument::null(), &TypeInfo::Utf8).unwrap().is_none());

    let err = value_to_argument(rt, &HostValue::from("a\0b"), &TypeInfo::Utf8).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn test_filename_decodes_like_utf8() {
    let fx = fixture();
    let argument = Argument::Pointer(Pointer::Owned(std::ffi::CString::new("/tmp/x").unwrap()));
    let value = argument_to_value(&fx.runtime, argument, &TypeInfo::Filename).unwrap();
    assert_eq!(value, HostValue::from("/tmp/x"));
}

#[test]
fn test_fixed_array_size() {
    let fx = fixture();
    let ty = TypeInfo::fixed_array(TypeInfo::Int32, 3);

    let three = HostValue::tuple([HostValue::from(1), HostValue::from(2), HostValue::from(3)]);
    assert!(check_representable(&fx.runtime, &three, &ty).is_ok());

    let two = HostValue::tuple([HostValue::from(1), HostValue::from(2)]);
    let err = check_representable(&fx.runtime, &two, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Size);
    assert_eq!(err.message(), "Must contain 3 items, not 2");
}

#[test]
fn test_array_requires_tuple() {
    let fx = fixture();
    let list = HostValue::List(vec![HostValue::from(1)]);
    let err = check_representable(&fx.runtime, &list, &TypeInfo::array(TypeInfo::Int8)).unwrap_err();
    assert_eq!(err.message(), "Must be tuple, not list");
}

#[test]
fn test_nested_item_prefix() {
    let fx = fixture();
    let ty = TypeInfo::array(TypeInfo::Int8);

    let value = HostValue::tuple([HostValue::from(1), HostValue::from(99999999)]);
    let err = check_representable(&fx.runtime, &value, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.message(), "Item 1: Must range from -128 to 127");
    assert_eq!(err.positions(), &[1]);

    // Short-circuits on the first bad item
    let value = HostValue::tuple([HostValue::from("ok"), HostValue::from(99999999)]);
    let err = check_representable(&fx.runtime, &value, &ty).unwrap_err();
    assert_eq!(err.message(), "Item 0: Must be int or long, not str");
}

#[test]
fn test_nested_arrays_prefix_each_level() {
    let fx = fixture();
    let ty = TypeInfo::array(TypeInfo::array(TypeInfo::UInt8));
    let value = HostValue::tuple([
        HostValue::tuple([HostValue::from(1)]),
        HostValue::tuple([HostValue::from(2), HostValue::from(-3)]),
    ]);

    let err = check_representable(&fx.runtime, &value, &ty).unwrap_err();
    assert_eq!(err.message(), "Item 1: Item 1: Must range from 0 to 255");
    assert_eq!(err.positions(), &[1, 1]);
}

#[test]
fn test_zero_terminated_round_trip_ignores_length() {
    let fx = fixture();
    let marshaller = Marshaller::new(&fx.runtime);
    let ty = TypeInfo::zero_terminated_array(TypeInfo::Int32);
    let value = HostValue::tuple([HostValue::from(10), HostValue::from(20), HostValue::from(30)]);

    let packed = marshaller.to_array(&value, &ty).unwrap();
    assert_eq!(packed.len(), 3);

    for length in [0, 1, 3, 1000] {
        let back = unsafe { marshaller.array_to_value(packed.as_ptr(), length, &ty) }.unwrap();
        assert_eq!(back, value);
    }
}

#[test]
fn test_array_argument_must_be_unpacked_separately() {
    let fx = fixture();
    let ty = TypeInfo::array(TypeInfo::Int8);
    let argument = value_to_argument(&fx.runtime, &HostValue::tuple([HostValue::from(1)]), &ty).unwrap();
    assert!(matches!(&argument, Argument::Pointer(Pointer::Array(packed)) if packed.len() == 1));

    let err = argument_to_value(&fx.runtime, argument, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Array));
}

#[test]
fn test_arrays_of_containers_are_unsupported() {
    let fx = fixture();
    let strict = Marshaller::with_config(&fx.runtime, MarshalConfig::strict());

    let nested = TypeInfo::array(TypeInfo::array(TypeInfo::UInt8));
    let value = HostValue::tuple([HostValue::tuple([HostValue::from(1)])]);
    assert!(check_representable(&fx.runtime, &value, &nested).is_ok());
    let err = strict.to_argument(&value, &nested).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Array));
    assert!(!err.is_recoverable());

    let buttons = TypeInfo::array(TypeInfo::Interface(fx.button.info().clone()));
    let button = fx.runtime.new_object(ForeignHandle::new(0xb0).unwrap(), &fx.button);
    let value = HostValue::tuple([button]);
    assert!(check_representable(&fx.runtime, &value, &buttons).is_ok());
    let err = value_to_argument(&fx.runtime, &value, &buttons).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Interface));

    let err = strict.to_arguments(&[value], &[buttons.clone()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Interface));
    assert_eq!(err.positions(), &[0]);

    let slot = [1u8; 16];
    let err = unsafe { strict.array_to_value(slot.as_ptr(), 1, &buttons) }.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Interface));
}

#[test]
fn test_list_preserves_order_and_frees_backbone() {
    let fx = fixture();
    let list = ForeignList::from_items(
        ListKind::Singly,
        ["x", "y", "z"]
            .iter()
            .map(|s| Argument::Pointer(Pointer::Owned(std::ffi::CString::new(*s).unwrap()))),
    );

    let (values, freed) = convert_nodes(&fx.runtime, list, &TypeInfo::Utf8);
    assert_eq!(
        values.unwrap(),
        vec![HostValue::from("x"), HostValue::from("y"), HostValue::from("z")]
    );
    assert_eq!(freed, 3);
}

#[test]
fn test_list_argument_to_value() {
    let fx = fixture();
    let ty = TypeInfo::glist(TypeInfo::Int32);
    let list = ForeignList::from_items(ListKind::Doubly, [Argument::Int32(1), Argument::Int32(2)]);

    let value = argument_to_value(&fx.runtime, Argument::Pointer(Pointer::List(list)), &ty).unwrap();
    assert_eq!(value, HostValue::List(vec![HostValue::from(1), HostValue::from(2)]));

    let empty = argument_to_value(&fx.runtime, Argument::null(), &ty).unwrap();
    assert_eq!(empty, HostValue::List(Vec::new()));

    // A singly linked list is not a GList
    let list = ForeignList::from_items(ListKind::Singly, [Argument::Int32(1)]);
    let err = argument_to_value(&fx.runtime, Argument::Pointer(Pointer::List(list)), &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn test_list_frees_backbone_on_failure() {
    let fx = fixture();
    let list = ForeignList::from_items(
        ListKind::Singly,
        [Argument::Int32(1), Argument::Double(2.0), Argument::Int32(3)],
    );

    let (values, freed) = convert_nodes(&fx.runtime, list, &TypeInfo::Int32);
    assert!(values.is_err());
    assert_eq!(freed, 3);
}

#[test]
fn test_enum_membership_not_checked() {
    let fx = fixture();
    let ty = orientation();

    // No enumerant is valued 42
    assert!(check_representable(&fx.runtime, &HostValue::from(42), &ty).is_ok());
    assert!(check_representable(&fx.runtime, &HostValue::Float(1.5), &ty).is_ok());

    let err = check_representable(&fx.runtime, &HostValue::from("a"), &ty).unwrap_err();
    assert_eq!(err.message(), "Must be int, not str");

    let argument = value_to_argument(&fx.runtime, &HostValue::from(42), &ty).unwrap();
    assert_eq!(argument_to_value(&fx.runtime, argument, &ty).unwrap(), HostValue::from(42));
}

#[test]
fn test_error_reported_iff_failure() {
    let fx = fixture();
    let cases = [
        (HostValue::from(1), TypeInfo::Int8, true),
        (HostValue::from(1000), TypeInfo::Int8, false),
        (HostValue::from("s"), TypeInfo::Utf8, true),
        (HostValue::None, TypeInfo::Utf8, false),
        (HostValue::tuple([]), TypeInfo::fixed_array(TypeInfo::Int8, 0), true),
        (HostValue::tuple([]), TypeInfo::fixed_array(TypeInfo::Int8, 1), false),
    ];

    for (value, ty, accepted) in cases {
        let result = check_representable(&fx.runtime, &value, &ty);
        assert_eq!(result.is_ok(), accepted, "{:?} as {}", value, ty);
        if let Err(err) = result {
            assert!(!err.message().is_empty());
        }
    }
}

#[test]
fn test_unsupported_tags_in_check() {
    let fx = fixture();
    for ty in [
        TypeInfo::TimeT,
        TypeInfo::Filename,
        TypeInfo::glist(TypeInfo::Int8),
        TypeInfo::gslist(TypeInfo::Int8),
        TypeInfo::GHash(Box::new(TypeInfo::Utf8), Box::new(TypeInfo::Utf8)),
        TypeInfo::Error,
    ] {
        let err = check_representable(&fx.runtime, &HostValue::None, &ty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported(ty.tag()));
        assert!(!err.is_recoverable());
    }
}

#[test]
fn test_unsupported_tags_in_conversion() {
    let fx = fixture();
    let err = value_to_argument(&fx.runtime, &HostValue::from(1), &TypeInfo::TimeT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::TimeT));

    let err = argument_to_value(&fx.runtime, Argument::null(), &TypeInfo::Error).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Error));
}

#[test]
fn test_inconsistent_argument() {
    let fx = fixture();
    let err = argument_to_value(&fx.runtime, Argument::Int8(1), &TypeInfo::Int16).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.message(), "Argument holds int8, not int16");
}

#[test]
fn test_object_identity_check() {
    let mut fx = fixture();
    let label = fx
        .runtime
        .register_class(InterfaceInfo::object("Gtk", "Label", GType(0x2004)));
    let ty = TypeInfo::Interface(fx.button.info().clone());

    let handle = ForeignHandle::new(0xdead0).unwrap();
    let button = fx.runtime.new_object(handle, &fx.button);
    let not_button = fx.runtime.new_object(handle, &label);

    assert!(check_representable(&fx.runtime, &button, &ty).is_ok());

    let err = check_representable(&fx.runtime, &not_button, &ty).unwrap_err();
    assert_eq!(err.message(), "Must be Button, not Label");
    assert_eq!(err.expected(), Some("Button"));

    let err = check_representable(&fx.runtime, &HostValue::None, &ty).unwrap_err();
    assert_eq!(err.message(), "Must be Button, not NoneType");
}

#[test]
fn test_object_handle_is_borrowed() {
    let fx = fixture();
    let ty = TypeInfo::Interface(fx.button.info().clone());
    let handle = ForeignHandle::new(0xdead0).unwrap();
    let button = fx.runtime.new_object(handle, &fx.button);

    let argument = value_to_argument(&fx.runtime, &button, &ty).unwrap();
    match &argument {
        Argument::Pointer(pointer @ Pointer::Borrowed(h)) => {
            assert_eq!(*h, handle);
            assert!(!pointer.is_owned());
        }
        other => panic!("expected a borrowed handle, got {:?}", other),
    }
    assert_eq!(argument_to_value(&fx.runtime, argument, &ty).unwrap(), button);

    assert!(value_to_argument(&fx.runtime, &HostValue::None, &ty).unwrap().is_null());
}

#[test]
fn test_null_object_and_struct_become_none() {
    let fx = fixture();
    for class in [&fx.button, &fx.color] {
        let ty = TypeInfo::Interface(class.info().clone());
        assert!(argument_to_value(&fx.runtime, Argument::null(), &ty).unwrap().is_none());
    }
}

#[test]
fn test_type_not_defined() {
    let fx = fixture();
    let ty = TypeInfo::interface(InterfaceInfo::structure("Pango", "Rectangle", GType(0x5000), 16));
    let view = BufferView::whole(ForeignMemory::zeroed(16));

    let err = argument_to_value(&fx.runtime, Argument::Pointer(Pointer::View(view)), &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.message(), "Type Pango.Rectangle not defined");

    // Resolution happens before the null check
    let err = argument_to_value(&fx.runtime, Argument::null(), &ty).unwrap_err();
    assert_eq!(err.message(), "Type Pango.Rectangle not defined");
}

#[test]
fn test_struct_is_zero_copy_view() {
    let fx = fixture();
    let ty = TypeInfo::Interface(fx.color.info().clone());
    let memory = ForeignMemory::zeroed(32);

    let value = argument_to_value(
        &fx.runtime,
        Argument::Pointer(Pointer::View(BufferView::whole(memory.clone()))),
        &ty,
    )
    .unwrap();

    let instance = match &value {
        HostValue::Wrapped(Wrapped::Struct(instance)) => instance,
        other => panic!("expected a struct instance, got {:?}", other),
    };
    assert_eq!(instance.class(), &fx.color);
    let buffer = instance.buffer().unwrap();
    assert_eq!(buffer.len(), 12);

    // Writes through the instance land in foreign memory
    assert!(buffer.write(0, &[1, 2, 3]));
    assert_eq!(&memory.snapshot()[..3], &[1, 2, 3]);

    assert!(check_representable(&fx.runtime, &value, &ty).is_ok());
    let argument = value_to_argument(&fx.runtime, &value, &ty).unwrap();
    match argument {
        Argument::Pointer(Pointer::View(view)) => assert!(view.memory().ptr_eq(&memory)),
        other => panic!("expected a buffer view, got {:?}", other),
    }
}

#[test]
fn test_struct_identity_check() {
    let fx = fixture();
    let ty = TypeInfo::Interface(fx.color.info().clone());
    let err = check_representable(&fx.runtime, &HostValue::from(1), &ty).unwrap_err();
    assert_eq!(err.message(), "Must be Color, not int");

    let bare = HostValue::Wrapped(Wrapped::Struct(StructInstance::bare(fx.color.clone())));
    let err = value_to_argument(&fx.runtime, &bare, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn test_generic_value_struct() {
    let fx = fixture();
    let ty = TypeInfo::interface(InterfaceInfo::new(InfoType::Boxed, "GObject", "Value", GType::VALUE));

    // Opaque passthrough in the check
    assert!(check_representable(&fx.runtime, &HostValue::tuple([]), &ty).is_ok());

    let argument = value_to_argument(&fx.runtime, &HostValue::from(17), &ty).unwrap();
    match &argument {
        Argument::Pointer(Pointer::Value(gvalue)) => assert_eq!(gvalue.gtype(), GType::INT64),
        other => panic!("expected a generic value, got {:?}", other),
    }
    assert_eq!(argument_to_value(&fx.runtime, argument, &ty).unwrap(), HostValue::from(17));
}

#[test]
fn test_closure_struct() {
    let fx = fixture();
    let ty = TypeInfo::interface(InterfaceInfo::new(InfoType::Boxed, "GObject", "Closure", GType::CLOSURE));
    let callable = HostValue::Callable(HostCallable::new("on_click"));

    assert!(check_representable(&fx.runtime, &callable, &ty).is_ok());
    let err = check_representable(&fx.runtime, &HostValue::from(1), &ty).unwrap_err();
    assert_eq!(err.message(), "Must be callable, not int");

    let argument = value_to_argument(&fx.runtime, &callable, &ty).unwrap();
    assert!(matches!(&argument, Argument::Pointer(Pointer::Closure(c)) if c.callable().name() == "on_click"));
    assert_eq!(fx.runtime.closures_created(), 1);
    assert_eq!(argument_to_value(&fx.runtime, argument, &ty).unwrap(), callable);
}

#[test]
fn test_gtype_tag() {
    let fx = fixture();
    assert!(check_representable(&fx.runtime, &HostValue::from("GtkButton"), &TypeInfo::GType).is_ok());

    let err = check_representable(&fx.runtime, &HostValue::from("Missing"), &TypeInfo::GType).unwrap_err();
    assert_eq!(err.message(), "Must be GType, not str");

    let argument = value_to_argument(&fx.runtime, &HostValue::from("GtkButton"), &TypeInfo::GType).unwrap();
    assert_eq!(argument, Argument::GType(GType(0x2000)));
    assert_eq!(
        argument_to_value(&fx.runtime, argument, &TypeInfo::GType).unwrap(),
        HostValue::Wrapped(Wrapped::Type(GType(0x2000)))
    );

    // Error tag: None is a null pointer, anything else resolves like GType
    assert!(value_to_argument(&fx.runtime, &HostValue::None, &TypeInfo::Error).unwrap().is_null());
    let argument = value_to_argument(&fx.runtime, &HostValue::from("gint"), &TypeInfo::Error).unwrap();
    assert_eq!(argument, Argument::GType(GType::INT));
}

#[test]
fn test_strict_marshaller_validates() {
    let fx = fixture();
    let lenient = Marshaller::new(&fx.runtime);
    let strict = Marshaller::with_config(&fx.runtime, MarshalConfig::strict());

    assert_eq!(lenient.to_argument(&HostValue::from(256), &TypeInfo::UInt8).unwrap(), Argument::UInt8(0));

    let err = strict.to_argument(&HostValue::from(256), &TypeInfo::UInt8).unwrap_err();
    assert_eq!(err.message(), "Must range from 0 to 255");
    assert!(strict.config().strict);
}

#[test]
fn test_batch_prefixes_argument_position() {
    let fx = fixture();
    let marshaller = Marshaller::with_config(&fx.runtime, MarshalConfig::strict());
    let types = [TypeInfo::Int32, TypeInfo::array(TypeInfo::Int8)];

    let good = [HostValue::from(1), HostValue::tuple([HostValue::from(2)])];
    assert_eq!(marshaller.to_arguments(&good, &types).unwrap().len(), 2);

    let bad = [HostValue::from(1), HostValue::tuple([HostValue::from(2), HostValue::from(500)])];
    let err = marshaller.to_arguments(&bad, &types).unwrap_err();
    assert_eq!(err.message(), "Argument 1: Item 1: Must range from -128 to 127");
    assert_eq!(err.positions(), &[1, 1]);

    let err = marshaller.to_arguments(&good[..1], &types).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Size);
    assert_eq!(err.message(), "Must contain 2 items, not 1");
}

#[test]
fn test_union_interface_unsupported() {
    let fx = fixture();
    let ty = TypeInfo::interface(InterfaceInfo::new(InfoType::Union, "Gdk", "Event", GType(0x6000)));
    let err = check_representable(&fx.runtime, &HostValue::None, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Interface));
    let err = value_to_argument(&fx.runtime, &HostValue::None, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported(TypeTag::Interface));
}

#[test]
fn test_runtime_is_object_safe() {
    let fx = fixture();
    let runtime: Rc<dyn Runtime> = Rc::new(fx.runtime);
    assert!(resolve_class(runtime.as_ref(), fx.color.info()).is_some());
}
