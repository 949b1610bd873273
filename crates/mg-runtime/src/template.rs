use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use mg_core::{MapgenError, MgValue};
use mg_parser::{parse_xml_document, ATTRIBUTE_PREFIX};

use crate::file_access::FileAccess;

pub const ENTITY_ROOT: &str = "Entity";
pub const PARENT_ATTRIBUTE: &str = "parent";
pub const TEMPLATE_EXTENSION: &str = "xml";
pub const DEFAULT_TEMPLATE_ROOT: &str = "../../simulation/templates";
/// Deepest inheritance level that still resolves; one more is treated as a loop.
pub const MAX_TEMPLATE_DEPTH: usize = 100;

/// Resolves entity templates through their `parent` chains and memoizes the
/// composed trees.
///
/// Cached trees are never handed out directly; every read returns a clone.
pub struct TemplateEngine {
    files: Rc<dyn FileAccess>,
    template_root: String,
    cache: RefCell<HashMap<String, MgValue>>,
}

impl TemplateEngine {
    pub fn new(files: Rc<dyn FileAccess>, template_root: impl Into<String>) -> Self {
        Self {
            files,
            template_root: template_root.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The composed `Entity` tree for `path`.
    pub fn get_template(&self, path: &str) -> Result<MgValue, MapgenError> {
        self.resolve(path, 0)
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.borrow().contains_key(path)
    }

    /// Resolves `path` at inheritance `depth`.
    ///
    /// Depth 0 yields the `Entity` sub-tree; deeper levels yield the whole
    /// document wrapper so the caller can merge over it.
    pub fn resolve(&self, path: &str, depth: usize) -> Result<MgValue, MapgenError> {
        debug!("Get Template: {} depth={}", path, depth);

        let cached = self
            .cache
            .borrow()
            .get(path)
            .map(|tree| shape_for_depth(tree, depth));
        if let Some(value) = cached {
            return Ok(value);
        }

        if depth > MAX_TEMPLATE_DEPTH {
            return Err(MapgenError::TemplateInheritanceLoop {
                path: path.to_string(),
            });
        }

        let document_path = format!("{}/{}.{}", self.template_root, path, TEMPLATE_EXTENSION);
        let source = self
            .files
            .read_to_string(&document_path)
            .map_err(|error| MapgenError::file_read(document_path.as_str(), error))?;
        let mut document = parse_xml_document(&source, &document_path)?;

        let composed = match take_parent(&mut document, &document_path)? {
            Some(parent) => {
                let parent_tree = self.resolve(&parent, depth + 1)?;
                deep_merge(parent_tree, document)
            }
            None => document,
        };

        let value = shape_for_depth(&composed, depth);
        self.cache.borrow_mut().insert(path.to_string(), composed);
        Ok(value)
    }
}

/// Removes the parent reference from the document's `Entity` root.
fn take_parent(document: &mut MgValue, document_path: &str) -> Result<Option<String>, MapgenError> {
    let Some(entity) = document
        .as_map_mut()
        .and_then(|root| root.get_mut(ENTITY_ROOT))
    else {
        return Err(MapgenError::document_parse(
            document_path,
            format!("template root element must be <{}>", ENTITY_ROOT),
        ));
    };

    let parent_key = format!("{}{}", ATTRIBUTE_PREFIX, PARENT_ATTRIBUTE);
    let parent = entity
        .as_map_mut()
        .and_then(|fields| fields.remove(&parent_key));
    Ok(match parent {
        Some(MgValue::String(name)) if !name.is_empty() => Some(name),
        _ => None,
    })
}

fn shape_for_depth(tree: &MgValue, depth: usize) -> MgValue {
    if depth == 0 {
        tree.get(ENTITY_ROOT).cloned().unwrap_or(MgValue::Null)
    } else {
        tree.clone()
    }
}

/// Merges `overlay` over `base`.
///
/// Maps merge key by key, arrays concatenate with the overlay's elements first,
/// and anything else takes the overlay's value.
pub fn deep_merge(base: MgValue, overlay: MgValue) -> MgValue {
    match (base, overlay) {
        (MgValue::Map(mut base), MgValue::Map(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            MgValue::Map(base)
        }
        (MgValue::Array(base), MgValue::Array(mut overlay)) => {
            overlay.extend(base);
            MgValue::Array(overlay)
        }
        (_, overlay) => overlay,
    }
}
