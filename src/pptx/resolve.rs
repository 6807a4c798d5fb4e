//! Placeholder matching and inherited geometry resolution.
//!
//! A slide placeholder without its own transform takes position and size
//! from the matching layout placeholder, which in turn may inherit from the
//! master. Each component (offset, extent, geometry) falls back on its own.

use super::presentation::Presentation;
use super::slide::child_keys;
use crate::error::{Error, Result};
use crate::model::{
    GeometryType, GroupTransform, PartRef, Placeholder, PlaceholderType, ResolvedBox, ShapeKey,
    ShapeKind, Transform,
};
use crate::xml::XmlElement;
use log::{debug, warn};

/// Pick the candidate a placeholder inherits from.
///
/// Candidates are visited in document order and the first one that passes
/// any of these checks wins: equal indices (both set), either type unset,
/// both `Body` with equal indices, both `Title`, both `CenteredTitle`.
/// When none passes, the first candidate with exactly the same type is used.
pub fn match_placeholder(target: &Placeholder, candidates: &[Placeholder]) -> Option<usize> {
    let found = candidates.iter().position(|c| {
        if target.index.is_some() && target.index == c.index {
            return true;
        }
        match (target.placeholder_type, c.placeholder_type) {
            (None, _) | (_, None) => true,
            (Some(PlaceholderType::Body), Some(PlaceholderType::Body)) => {
                target.index.is_some() && target.index == c.index
            }
            (Some(PlaceholderType::Title), Some(PlaceholderType::Title)) => true,
            (Some(PlaceholderType::CenteredTitle), Some(PlaceholderType::CenteredTitle)) => true,
            _ => false,
        }
    });
    if found.is_some() {
        return found;
    }

    target.placeholder_type.and_then(|t| {
        candidates
            .iter()
            .position(|c| c.placeholder_type == Some(t))
    })
}

/// Top-level placeholder `sp` elements of a part in document order.
fn placeholder_candidates(pres: &Presentation, part: PartRef) -> Vec<(ShapeKey, Placeholder)> {
    child_keys(pres, part, None)
        .into_iter()
        .filter_map(|key| {
            let el = pres.element(&key).ok()?;
            if !el.is("sp") {
                return None;
            }
            let ph = Placeholder::of_shape(el)?;
            Some((key, ph))
        })
        .collect()
}

fn match_in_part(pres: &Presentation, part: PartRef, target: &Placeholder) -> Option<ShapeKey> {
    let candidates = placeholder_candidates(pres, part);
    let keys: Vec<Placeholder> = candidates.iter().map(|(_, ph)| *ph).collect();
    match_placeholder(target, &keys).map(|i| candidates[i].0.clone())
}

/// The layout (for slide shapes) or master (for layout shapes) placeholder a
/// shape inherits from. A slide placeholder with no layout match is tried
/// against the master directly.
pub(crate) fn referenced_shape(pres: &Presentation, key: &ShapeKey) -> Option<ShapeKey> {
    let el = pres.element(key).ok()?;
    let target = Placeholder::of_shape(el)?;
    let parent = pres.inherited_part(key.part)?;

    if let Some(found) = match_in_part(pres, parent, &target) {
        return Some(found);
    }

    if let PartRef::Layout(_) = parent {
        if let Some(master) = pres.inherited_part(parent) {
            if let Some(found) = match_in_part(pres, master, &target) {
                debug!("{}: no layout placeholder match, using master", key);
                return Some(found);
            }
        }
    }

    warn!("{}: placeholder {:?} has no match", key, target);
    None
}

/// Explicit transform of a shape element.
pub(crate) fn explicit_transform(el: &XmlElement) -> Transform {
    xfrm_element(el).map(Transform::from_xfrm).unwrap_or_default()
}

/// The element holding a shape's `off`/`ext`.
pub(crate) fn xfrm_element(el: &XmlElement) -> Option<&XmlElement> {
    match ShapeKind::from_element(el)? {
        ShapeKind::Group => el.path(&["grpSpPr", "xfrm"]),
        ShapeKind::Chart | ShapeKind::Table | ShapeKind::OleObject | ShapeKind::Diagram => {
            el.child("xfrm")
        }
        _ => el.path(&["spPr", "xfrm"]),
    }
}

/// Offset and extent of a shape in its own coordinate space (group child
/// space for grouped shapes), following the placeholder chain for missing
/// components.
pub(crate) fn resolved_box(pres: &Presentation, key: &ShapeKey) -> Result<ResolvedBox> {
    if let Some(cached) = pres.cache.borrow().get_box(key) {
        return Ok(cached);
    }

    let el = pres.element(key)?;
    let explicit = explicit_transform(el);
    let mut offset = explicit.offset;
    let mut extent = explicit.extent;

    if (offset.is_none() || extent.is_none()) && Placeholder::of_shape(el).is_some() {
        let inherited = match referenced_shape(pres, key) {
            Some(reference) => resolved_box(pres, &reference)?,
            None => ResolvedBox {
                offset: Some((0, 0)),
                extent: (0, 0),
            },
        };
        offset = offset.or(inherited.offset).or(Some((0, 0)));
        extent = extent.or(Some(inherited.extent));
    }

    let resolved = ResolvedBox {
        offset,
        extent: extent.unwrap_or_default(),
    };
    pres.cache.borrow_mut().put_box(key.clone(), resolved);
    Ok(resolved)
}

/// Transform of a group shape.
pub(crate) fn group_transform(pres: &Presentation, key: &ShapeKey) -> Result<GroupTransform> {
    let el = pres.element(key)?;
    Ok(el
        .path(&["grpSpPr", "xfrm"])
        .map(GroupTransform::from_xfrm)
        .unwrap_or_default())
}

/// Transforms of the enclosing groups, innermost first.
pub(crate) fn ancestor_transforms(pres: &Presentation, key: &ShapeKey) -> Result<Vec<GroupTransform>> {
    let mut result = Vec::new();
    let mut current = key.parent();
    while let Some(group) = current {
        result.push(group_transform(pres, &group)?);
        current = group.parent();
    }
    Ok(result)
}

/// Map a local offset to slide space through the enclosing groups.
pub(crate) fn local_to_slide(ancestors: &[GroupTransform], (mut x, mut y): (i64, i64)) -> (i64, i64) {
    for g in ancestors {
        x = g.child_to_parent_x(x);
        y = g.child_to_parent_y(y);
    }
    (x, y)
}

/// Map a slide-space offset to the local space of a shape inside the groups.
pub(crate) fn slide_to_local(ancestors: &[GroupTransform], (mut x, mut y): (i64, i64)) -> (i64, i64) {
    for g in ancestors.iter().rev() {
        x = g.parent_to_child_x(x);
        y = g.parent_to_child_y(y);
    }
    (x, y)
}

/// Offset of a shape in slide space.
pub(crate) fn slide_offset(pres: &Presentation, key: &ShapeKey) -> Result<(i64, i64)> {
    let local = resolved_box(pres, key)?.offset.ok_or_else(|| {
        Error::ResolutionExhausted(format!(
            "{} has no transform and is not a placeholder",
            key
        ))
    })?;
    Ok(local_to_slide(&ancestor_transforms(pres, key)?, local))
}

/// Outline geometry, inherited through placeholders, defaulting to a rectangle.
pub(crate) fn geometry_type(pres: &Presentation, key: &ShapeKey) -> Result<GeometryType> {
    let el = pres.element(key)?;
    if let Some(geometry) = el.child("spPr").and_then(GeometryType::from_shape_properties) {
        return Ok(geometry);
    }
    if Placeholder::of_shape(el).is_some() {
        if let Some(reference) = referenced_shape(pres, key) {
            return geometry_type(pres, &reference);
        }
    }
    Ok(GeometryType::default())
}
