use montage_assembly::{
    Array, ArrayOneToOne, ArraySet, Assembly, ListUse, Model, MultiProvide, MultiUse, UseProvide,
};
use montage_component::test_utils::{IntBox, IntProvider, IntReducer, IntUser};
use montage_types::{AssemblyError, PortAddress, addr};

#[test]
fn multi_use_broadcast_sums_to_47() {
    let mut model = Model::new();
    model.composite_with("Array", Array::new(3, || IntBox::new(12)));
    model.component("Reducer", IntReducer::new);
    model.connect::<MultiUse<dyn IntProvider>>((
        PortAddress::new("ptr", "Reducer"),
        "Array".into(),
    ));

    let assembly = Assembly::new(&model).unwrap();
    assembly.at_mut::<IntBox>(&addr!("Array", 1)).unwrap().value = 23;

    let reducer = assembly.at::<IntReducer>(&addr!("Reducer")).unwrap();
    assert_eq!(reducer.inputs(), ["Array_0", "Array_1", "Array_2"]);
    assert_eq!(reducer.sum().unwrap(), 47);
    drop(reducer);

    let as_provider = assembly.handle::<dyn IntProvider>(&addr!("Reducer")).unwrap();
    assert_eq!(as_provider.with(|p| p.get()).unwrap().unwrap(), 47);
}

#[test]
fn array_one_to_one_rejects_unequal_sizes() {
    let mut model = Model::new();
    model.composite_with("users", Array::new(5, IntUser::new));
    model.composite_with("boxes", Array::new(4, || IntBox::new(0)));
    model.connect::<ArrayOneToOne<dyn IntProvider>>((
        addr!("users"),
        "ptr".to_owned(),
        addr!("boxes"),
    ));

    let err = Assembly::new(&model).unwrap_err();
    match &err {
        AssemblyError::ArraySizeMismatch {
            left,
            left_size,
            right,
            right_size,
        } => {
            assert_eq!(left, &addr!("users"));
            assert_eq!(*left_size, 5);
            assert_eq!(right, &addr!("boxes"));
            assert_eq!(*right_size, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.code(), "ARRAY_SIZE_MISMATCH");
    let message = err.to_string();
    assert!(message.contains("users") && message.contains("boxes"));
    assert!(message.contains('5') && message.contains('4'));
}

#[test]
fn array_one_to_one_pairs_by_index() {
    let mut model = Model::new();
    model.composite_with("users", Array::new(3, IntUser::new));
    let boxes = model.composite("boxes");
    for i in 0..3 {
        boxes.component(i, move || IntBox::new(i * 10));
    }
    model.connect::<ArrayOneToOne<dyn IntProvider>>((
        addr!("users"),
        "ptr".to_owned(),
        addr!("boxes"),
    ));

    let assembly = Assembly::new(&model).unwrap();
    for i in 0..3 {
        let user = assembly.at::<IntUser>(&addr!("users", i)).unwrap();
        assert_eq!(user.read().unwrap().unwrap(), i * 10);
    }
}

#[test]
fn element_failures_are_wrapped_with_the_connector_name() {
    let mut model = Model::new();
    model.composite_with("users", Array::new(2, IntUser::new));
    // element 1 is not a provider
    let mixed = model.composite("mixed");
    mixed.component(0, || IntBox::new(0));
    mixed.component(1, IntUser::new);
    model.connect::<ArrayOneToOne<dyn IntProvider>>((
        addr!("users"),
        "ptr".to_owned(),
        addr!("mixed"),
    ));

    let err = Assembly::new(&model).unwrap_err();
    assert_eq!(err.code(), "CONNECTOR_RESOLUTION_FAILURE");
    match &err {
        AssemblyError::ConnectorResolution { connector, .. } => {
            assert_eq!(connector, "ArrayOneToOne<dyn IntProvider>");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(err.root_cause(), AssemblyError::TypeMismatch { .. }));
}

#[test]
fn multi_use_on_a_leaf_is_a_resolution_failure() {
    let mut model = Model::new();
    model.component("box", || IntBox::new(0));
    model.component("sum", IntReducer::new);
    model.connect::<MultiUse<dyn IntProvider>>((PortAddress::new("ptr", "sum"), "box".into()));

    let err = Assembly::new(&model).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        AssemblyError::CompositeNotFound { .. }
    ));
}

#[test]
fn multi_provide_gives_every_element_the_same_provider() {
    let mut model = Model::new();
    model.component("source", || IntBox::new(9));
    model.composite_with("users", Array::new(4, IntUser::new));
    model.connect::<MultiProvide<dyn IntProvider>>((
        addr!("users"),
        "ptr".to_owned(),
        addr!("source"),
    ));

    let assembly = Assembly::new(&model).unwrap();
    for i in 0..4 {
        let user = assembly.at::<IntUser>(&addr!("users", i)).unwrap();
        assert_eq!(user.target(), Some("source"));
    }
    assembly.at_mut::<IntBox>(&addr!("source")).unwrap().value = 10;
    let user = assembly.at::<IntUser>(&addr!("users", 3)).unwrap();
    assert_eq!(user.read().unwrap().unwrap(), 10);
}

#[test]
fn list_use_connects_in_list_order() {
    let mut model = Model::new();
    model.component("a", || IntBox::new(1));
    model.component("b", || IntBox::new(2));
    model.composite("deep").component("c", || IntBox::new(3));
    model.component("sum", IntReducer::new);
    model.connect::<ListUse<dyn IntProvider>>((
        PortAddress::new("ptr", "sum"),
        vec![addr!("deep", "c"), addr!("a"), addr!("b")],
    ));

    let assembly = Assembly::new(&model).unwrap();
    let sum = assembly.at::<IntReducer>(&addr!("sum")).unwrap();
    assert_eq!(sum.inputs(), ["deep_c", "a", "b"]);
    assert_eq!(sum.sum().unwrap(), 6);
}

#[test]
fn use_provide_copies_the_current_value() {
    let mut model = Model::new();
    model.component("box", || IntBox::new(5));
    model.component("user", IntUser::new);
    model.connect::<UseProvide<i32>>((
        PortAddress::new("value", "user"),
        PortAddress::new("get", "box"),
    ));

    let assembly = Assembly::new(&model).unwrap();
    assembly.at_mut::<IntBox>(&addr!("box")).unwrap().value = 6;
    // a copy, not a reference
    assert_eq!(assembly.at::<IntUser>(&addr!("user")).unwrap().copied(), Some(5));
}

#[test]
fn array_set_assigns_by_index() {
    let mut model = Model::new();
    model.composite_with("boxes", Array::new(3, IntBox::default));
    model.connect::<ArraySet<i32>>((addr!("boxes"), "value".to_owned(), vec![4, 5, 6]));

    let assembly = Assembly::new(&model).unwrap();
    let values: Vec<i32> = (0..3)
        .map(|i| assembly.at::<IntBox>(&addr!("boxes", i)).unwrap().value)
        .collect();
    assert_eq!(values, [4, 5, 6]);
}

#[test]
fn array_set_rejects_wrong_length() {
    let mut model = Model::new();
    model.composite_with("boxes", Array::new(3, IntBox::default));
    model.connect::<ArraySet<i32>>((addr!("boxes"), "value".to_owned(), vec![4, 5]));

    let err = Assembly::new(&model).unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::ArraySizeMismatch {
            left_size: 3,
            right_size: 2,
            ..
        }
    ));
}

#[test]
fn array_generator_reports_its_size() {
    let array = Array::new(6, IntUser::new);
    assert_eq!(array.size(), 6);
    let mut model = Model::new();
    model.composite_with("a", array);
    assert_eq!(
        model
            .get_composite(&addr!("a"))
            .unwrap()
            .component_keys()
            .count(),
        6
    );
}
