use gimarshal::config::Config;
use gimarshal::interop::{
    Argument, BufferView, ForeignHandle, ForeignMemory, GType, HostValue, InterfaceInfo, Marshaller,
    MemoryRuntime, Pointer, TypeInfo, Wrapped,
};
use gimarshal::logging::{self, LogConfig};
use gimarshal::ErrorKind;
use std::fs;

fn runtime() -> MemoryRuntime {
    let mut runtime = MemoryRuntime::new();
    runtime.register_class(InterfaceInfo::structure("Gdk", "Rectangle", GType(0x100), 16));
    runtime.register_class(InterfaceInfo::object("Gtk", "Window", GType(0x200)));
    runtime
}

#[test]
fn test_call_site_arguments() {
    let _guard = logging::init_with_config(LogConfig::default());
    let runtime = runtime();
    let marshaller = Marshaller::new(&runtime);

    let window_class = runtime.class_of(GType(0x200)).unwrap().clone();
    let window = runtime.new_object(ForeignHandle::new(0x7f00).unwrap(), &window_class);

    let types = [
        TypeInfo::Interface(window_class.info().clone()),
        TypeInfo::Utf8,
        TypeInfo::fixed_array(TypeInfo::Double, 2),
        TypeInfo::Boolean,
    ];
    let values = [
        window.clone(),
        HostValue::from("title"),
        HostValue::tuple([HostValue::Float(0.5), HostValue::Float(1.5)]),
        HostValue::None,
    ];

    for (value, ty) in values.iter().zip(&types) {
        marshaller.check(value, ty).unwrap();
    }
    let arguments = marshaller.to_arguments(&values, &types).unwrap();
    assert_eq!(arguments.len(), 4);
    assert_eq!(arguments[3], Argument::Boolean(false));

    let mut arguments = arguments.into_iter();
    let first = arguments.next().unwrap();
    assert_eq!(marshaller.to_value(first, &types[0]).unwrap(), window);
    let second = arguments.next().unwrap();
    assert_eq!(marshaller.to_value(second, &types[1]).unwrap(), HostValue::from("title"));
}

#[test]
fn test_struct_field_access() {
    let runtime = runtime();
    let marshaller = Marshaller::new(&runtime);
    let ty = TypeInfo::Interface(runtime.class_of(GType(0x100)).unwrap().info().clone());

    let memory = ForeignMemory::zeroed(16);
    let value = marshaller
        .to_value(Argument::Pointer(Pointer::View(BufferView::whole(memory.clone()))), &ty)
        .unwrap();

    let instance = match &value {
        HostValue::Wrapped(Wrapped::Struct(instance)) => instance,
        other => panic!("expected a struct instance, got {:?}", other),
    };
    assert!(instance.buffer().unwrap().write(4, &7i32.to_ne_bytes()));
    assert_eq!(memory.snapshot()[4..8], 7i32.to_ne_bytes());

    // Too small for the declared struct size
    let small = Argument::Pointer(Pointer::View(BufferView::whole(ForeignMemory::zeroed(8))));
    let err = marshaller.to_value(small, &ty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Size);
}

#[test]
fn test_strict_mode_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".gimarshal.toml");
    fs::write(&path, "[marshal]\nstrict = true\n").unwrap();

    let config = Config::load(&path).unwrap();
    let runtime = runtime();
    let marshaller = Marshaller::with_config(&runtime, config.marshal);

    let err = marshaller.to_argument(&HostValue::from(70000), &TypeInfo::Int16).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.to_string(), "Must range from -32768 to 32767");

    let err = marshaller
        .to_array(&HostValue::tuple([HostValue::from("x")]), &TypeInfo::array(TypeInfo::Int16))
        .unwrap_err();
    assert_eq!(err.to_string(), "Item 0: Must be int or long, not str");
}

#[test]
fn test_gtype_round_trip() {
    let runtime = runtime();
    let marshaller = Marshaller::new(&runtime);

    let argument = marshaller.to_argument(&HostValue::from("GtkWindow"), &TypeInfo::GType).unwrap();
    let value = marshaller.to_value(argument, &TypeInfo::GType).unwrap();
    assert_eq!(value, HostValue::Wrapped(Wrapped::Type(GType(0x200))));

    // The wrapped type handle resolves to itself
    let argument = marshaller.to_argument(&value, &TypeInfo::GType).unwrap();
    assert_eq!(argument, Argument::GType(GType(0x200)));
}
