//! JSX call-site transform (pass 2).
//!
//! `<Tag attr={expr}>children</Tag>` becomes
//! `factory(Tag, {attr: expr}, ...children)` with the configured factory
//! and fragment paths. Lower-case and dashed tag names are intrinsic
//! elements and pass as strings; everything else is a component value.

use super::*;

impl<'a> Binder<'a> {
    pub(crate) fn lower_jsx_element(&mut self, span: Span, element: EJsxElement) -> Expr {
        let EJsxElement {
            tag,
            properties,
            children,
        } = element;

        let tag_expr = match tag {
            None => {
                let fragment = self.options.jsx.fragment.clone();
                let path: Vec<&str> = fragment.iter().map(String::as_str).collect();
                self.dotted_global(span, &path)
            }
            Some(tag) => match &tag.data {
                EData::IdentifierName(name) if is_intrinsic_tag(name) => {
                    Expr::new(tag.span, EData::String(EString::new(name.clone())))
                }
                _ => self.visit_expr(tag),
            },
        };

        let props_expr = if properties.is_empty() {
            Expr::new(span, EData::Null)
        } else {
            let visited: Vec<Property> = properties
                .into_iter()
                .map(|property| Property {
                    kind: property.kind,
                    key: property.key,
                    is_computed: property.is_computed,
                    is_method: property.is_method,
                    is_static: property.is_static,
                    is_shorthand: false,
                    value: property.value.map(|value| self.visit_expr(value)),
                    initializer: None,
                })
                .collect();
            let has_spread = visited
                .iter()
                .any(|property| property.kind == PropertyKind::Spread);
            let object = Expr::new(span, EData::Object(EObject { properties: visited }));
            if has_spread && !self.options.target.supports_object_spread() {
                self.lower_object_spread(object)
            } else {
                object
            }
        };

        let mut args = vec![tag_expr, props_expr];
        for child in children {
            args.push(self.visit_expr(child));
        }

        let factory = self.options.jsx.factory.clone();
        let path: Vec<&str> = factory.iter().map(String::as_str).collect();
        let factory_expr = self.dotted_global(span, &path);

        Expr::new(
            span,
            EData::Call(Box::new(ECall {
                target: factory_expr,
                args,
                optional_chain: OptionalChain::None,
                is_direct_eval: false,
            })),
        )
    }
}

/// Intrinsic elements start lower-case or contain a dash; components
/// are capitalized identifiers or member expressions.
fn is_intrinsic_tag(name: &str) -> bool {
    name.contains('-')
        || name
            .chars()
            .next()
            .map(|c| c.is_ascii_lowercase())
            .unwrap_or(false)
}
