//! Text rendering of values for difference descriptions

use super::graph::{Graph, Payload};
use super::value::Value;

impl Graph {
    /// Render a value the way difference descriptions show it
    ///
    /// Nodes nested inside the rendered node are shown shallowly, as their
    /// display member when the type names one, otherwise as `Type#id`. A
    /// display value is itself never resolved through another display member.
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        self.render_into(value, true, true, &mut out);
        out
    }

    fn render_into(&self, value: &Value, expand: bool, follow_display: bool, out: &mut String) {
        match value {
            Value::Missing => out.push_str("Undefined"),
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(&b.to_string()),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::Float(f) => out.push_str(&render_float(*f)),
            Value::Char(c) => out.push(*c),
            Value::Str(s) => out.push_str(s),
            Value::Node(id) => {
                let Ok(node) = self.node(*id) else {
                    out.push_str(&id.to_string());
                    return;
                };
                let ty = node.type_id();
                if follow_display {
                    if let Some(display) = self.display_value(*id) {
                        self.render_into(&display, false, false, out);
                        return;
                    }
                }
                if !expand {
                    out.push_str(self.types().name(ty));
                    out.push_str(&id.to_string());
                    return;
                }
                match &node.payload {
                    Payload::Record(_) => {
                        out.push_str(self.types().name(ty));
                        out.push('{');
                        let mut first = true;
                        for owner in self.types().ancestors(ty) {
                            let Ok(def) = self.types().get(owner) else {
                                continue;
                            };
                            for member in def.members().iter().filter(|m| !m.is_static()) {
                                if !first {
                                    out.push_str(", ");
                                }
                                first = false;
                                out.push_str(member.name());
                                out.push('=');
                                let v = self
                                    .get_declared(*id, owner, member.name())
                                    .unwrap_or(Value::Null);
                                self.render_into(&v, false, true, out);
                            }
                        }
                        out.push('}');
                    }
                    Payload::Sequence(items) | Payload::Array(items) => {
                        self.render_list(items.iter(), out);
                    }
                    Payload::Set(items) => self.render_list(items.iter(), out),
                    Payload::Map(entries) => {
                        out.push('{');
                        for (i, (k, v)) in entries.iter().enumerate() {
                            if i > 0 {
                                out.push_str(", ");
                            }
                            self.render_into(k, false, true, out);
                            out.push('=');
                            self.render_into(v, false, true, out);
                        }
                        out.push('}');
                    }
                }
            }
        }
    }

    fn render_list<'a>(&self, items: impl Iterator<Item = &'a Value>, out: &mut String) {
        out.push('[');
        for (i, item) in items.enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.render_into(item, false, true, out);
        }
        out.push(']');
    }

    fn display_value(&self, id: super::NodeId) -> Option<Value> {
        let ty = self.node(id).ok()?.type_id();
        let member = self
            .types()
            .ancestors(ty)
            .into_iter()
            .rev()
            .find_map(|t| self.types().get(t).ok()?.display())?;
        self.get(id, member).ok()
    }
}

/// Doubles print in plain notation within `[1e-3, 1e7)` and as `d.dddE±n`
/// outside it, with at least one fractional digit either way.
fn render_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{:?}", f);
    }
    let sci = format!("{:e}", f);
    match sci.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => sci,
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Graph, TypeDef, TypeId, Value};

    #[test]
    fn test_scalars() {
        let graph = Graph::new();
        assert_eq!(graph.render(&Value::Missing), "Undefined");
        assert_eq!(graph.render(&Value::Null), "null");
        assert_eq!(graph.render(&Value::from(10.0)), "10.0");
        assert_eq!(graph.render(&Value::from(10)), "10");
        assert_eq!(graph.render(&Value::from('x')), "x");
        assert_eq!(graph.render(&Value::from("test")), "test");
    }

    #[test]
    fn test_float_notation() {
        let graph = Graph::new();
        assert_eq!(graph.render(&Value::from(1e20)), "1.0E20");
        assert_eq!(graph.render(&Value::from(-2.5e-7)), "-2.5E-7");
        assert_eq!(graph.render(&Value::from(1e7)), "1.0E7");
        assert_eq!(graph.render(&Value::from(9999999.5)), "9999999.5");
        assert_eq!(graph.render(&Value::from(0.001)), "0.001");
        assert_eq!(graph.render(&Value::from(0.0)), "0.0");
        assert_eq!(graph.render(&Value::from(f64::NAN)), "NaN");
        assert_eq!(graph.render(&Value::from(f64::NEG_INFINITY)), "-Infinity");
    }

    #[test]
    fn test_record_and_nested_node() {
        let mut graph = Graph::new();
        let bean = graph
            .define(
                TypeDef::new("Bean")
                    .member("a", TypeId::INT)
                    .self_member("b"),
            )
            .unwrap();
        let inner = graph.new_record(bean).unwrap();
        let outer = graph.new_record(bean).unwrap();
        graph.set(outer, "a", 1).unwrap();
        graph.set(outer, "b", inner).unwrap();

        assert_eq!(
            graph.render(&Value::Node(outer)),
            format!("Bean{{a=1, b=Bean{}}}", inner)
        );
    }

    #[test]
    fn test_display_member() {
        let mut graph = Graph::new();
        let category = graph
            .define(
                TypeDef::new("Category")
                    .member("name", TypeId::STRING)
                    .display_member("name"),
            )
            .unwrap();
        let vw = graph.new_record(category).unwrap();
        graph.set(vw, "name", "vw").unwrap();
        assert_eq!(graph.render(&Value::Node(vw)), "vw");
    }

    #[test]
    fn test_display_member_referring_to_itself() {
        let mut graph = Graph::new();
        let node_ty = graph
            .define(TypeDef::new("Node").self_member("me").display_member("me"))
            .unwrap();
        let n = graph.new_record(node_ty).unwrap();
        graph.set(n, "me", n).unwrap();

        assert_eq!(graph.render(&Value::Node(n)), format!("Node{}", n));
    }

    #[test]
    fn test_mutually_referring_display_members() {
        let mut graph = Graph::new();
        let node_ty = graph
            .define(TypeDef::new("Node").self_member("peer").display_member("peer"))
            .unwrap();
        let a = graph.new_record(node_ty).unwrap();
        let b = graph.new_record(node_ty).unwrap();
        graph.set(a, "peer", b).unwrap();
        graph.set(b, "peer", a).unwrap();

        assert_eq!(graph.render(&Value::Node(a)), format!("Node{}", b));
        assert_eq!(graph.render(&Value::Node(b)), format!("Node{}", a));
    }

    #[test]
    fn test_display_member_inside_expanded_record() {
        let mut graph = Graph::new();
        let category = graph
            .define(
                TypeDef::new("Category")
                    .member("name", TypeId::STRING)
                    .display_member("name"),
            )
            .unwrap();
        let holder = graph
            .define(TypeDef::new("Holder").member("category", category))
            .unwrap();
        let vw = graph.new_record(category).unwrap();
        graph.set(vw, "name", "vw").unwrap();
        let h = graph.new_record(holder).unwrap();
        graph.set(h, "category", vw).unwrap();

        assert_eq!(graph.render(&Value::Node(h)), "Holder{category=vw}");
    }

    #[test]
    fn test_collections() {
        let mut graph = Graph::new();
        let list = graph.new_list().unwrap();
        graph.push(list, "a").unwrap();
        graph.push(list, 2).unwrap();
        let map = graph.hash_map().unwrap();
        graph.insert(map, "k", list).unwrap();

        assert_eq!(graph.render(&Value::Node(list)), "[a, 2]");
        assert_eq!(
            graph.render(&Value::Node(map)),
            format!("{{k=List{}}}", list)
        );
    }
}
