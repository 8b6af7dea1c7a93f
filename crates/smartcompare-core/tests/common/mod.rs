use smartcompare_core::{Graph, NodeId, TypeDef, TypeId, Value};

/// Ids of the bean hierarchy used across the comparison scenarios
///
/// `Bean { doubleField, stringField, colorField, beanField: Bean }` with two
/// subtypes that both declare their own `intField`.
#[allow(dead_code)]
pub struct Beans {
    pub bean: TypeId,
    pub sub1: TypeId,
    pub sub2: TypeId,
}

#[allow(dead_code)]
pub fn define_beans(graph: &mut Graph) -> Beans {
    let bean = graph
        .define(
            TypeDef::new("Bean")
                .member("doubleField", TypeId::FLOAT)
                .member("stringField", TypeId::STRING)
                .member("colorField", TypeId::STRING)
                .self_member("beanField")
                .static_member("INSTANCES", TypeId::INT),
        )
        .unwrap();
    let sub1 = graph
        .define(
            TypeDef::new("BeanSubclass1")
                .extends(bean)
                .member("intField", TypeId::INT)
                .member("floatField", TypeId::FLOAT_ARRAY),
        )
        .unwrap();
    let sub2 = graph
        .define(
            TypeDef::new("BeanSubclass2")
                .extends(bean)
                .member("intField", TypeId::INT)
                .member("listField", TypeId::LIST),
        )
        .unwrap();
    Beans { bean, sub1, sub2 }
}

/// Create a bean of type `ty` with its double and string fields set
#[allow(dead_code)]
pub fn new_bean(graph: &mut Graph, ty: TypeId, double: f64, string: &str) -> NodeId {
    let node = graph.new_record(ty).unwrap();
    graph.set(node, "doubleField", double).unwrap();
    graph.set(node, "stringField", string).unwrap();
    node
}

/// `Category { name, priority, parent: Category }`, rendered by name
#[allow(dead_code)]
pub fn define_category(graph: &mut Graph) -> TypeId {
    graph
        .define(
            TypeDef::new("Category")
                .member("name", TypeId::STRING)
                .member("priority", TypeId::INT)
                .self_member("parent")
                .display_member("name"),
        )
        .unwrap()
}

#[allow(dead_code)]
pub fn new_category(
    graph: &mut Graph,
    ty: TypeId,
    name: &str,
    priority: i64,
    parent: Option<NodeId>,
) -> NodeId {
    let node = graph.new_record(ty).unwrap();
    graph.set(node, "name", name).unwrap();
    graph.set(node, "priority", priority).unwrap();
    graph.set(node, "parent", parent).unwrap();
    node
}

/// Build a `List` of strings
#[allow(dead_code)]
pub fn string_list(graph: &mut Graph, items: &[&str]) -> NodeId {
    let list = graph.new_list().unwrap();
    for item in items {
        graph.push(list, *item).unwrap();
    }
    list
}

#[allow(dead_code)]
pub fn node(id: NodeId) -> Value {
    Value::Node(id)
}

/// Render differences one per line, as `print_differences` does
#[allow(dead_code)]
pub fn lines(diffs: &[smartcompare_core::Difference]) -> Vec<String> {
    diffs.iter().map(ToString::to_string).collect()
}
