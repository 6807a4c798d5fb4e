//! Keeping group boxes around their children.
//!
//! When a grouped shape moves, every enclosing group is re-fitted: the
//! innermost group first, then its parent for as long as a box changed.
//! Coordinates are EMU throughout.

use super::presentation::Presentation;
use super::resolve::group_transform;
use crate::error::Result;
use crate::model::{GroupTransform, ResolvedBox, ShapeKey};
use log::debug;

/// Re-fit a group after a child's horizontal position changed.
///
/// `child_left` is the child's left edge in the group's parent space.
/// A child left of the group shifts the group (and its child space) left and
/// widens it by the same amount; a child past the right edge widens the
/// group by the overshoot.
pub fn on_child_x_changed(group: &GroupTransform, child_left: i64, child_width: i64) -> GroupTransform {
    let mut next = *group;
    let group_right = group.off.0 + group.ext.0;
    let child_right = child_left + child_width;

    if child_left < group.off.0 {
        let delta = group.off.0 - child_left;
        next.off.0 -= delta;
        next.ext.0 += delta;
        next.ch_off.0 -= delta;
        next.ch_ext.0 += delta;
    } else if child_right > group_right {
        let overshoot = child_right - group_right;
        next.ext.0 += overshoot;
        next.ch_ext.0 += overshoot;
    }
    next
}

/// Re-fit a group after a child's vertical position changed.
///
/// The top edge is always adjusted. The bottom edge only grows when
/// `grow_bottom` is set.
pub fn on_child_y_changed(
    group: &GroupTransform,
    child_top: i64,
    child_height: i64,
    grow_bottom: bool,
) -> GroupTransform {
    let mut next = *group;
    let group_bottom = group.off.1 + group.ext.1;
    let child_bottom = child_top + child_height;

    if child_top < group.off.1 {
        let delta = group.off.1 - child_top;
        next.off.1 -= delta;
        next.ext.1 += delta;
        next.ch_off.1 -= delta;
        next.ch_ext.1 += delta;
    } else if grow_bottom && child_bottom > group_bottom {
        let overshoot = child_bottom - group_bottom;
        next.ext.1 += overshoot;
        next.ch_ext.1 += overshoot;
    }
    next
}

/// Compute the group updates caused by giving `child` the box `new_box` (in
/// its local space), from the innermost group outward. Nothing is written.
pub(crate) fn plan_propagation(
    pres: &Presentation,
    child: &ShapeKey,
    new_box: &ResolvedBox,
) -> Result<Vec<(ShapeKey, GroupTransform)>> {
    let grow_bottom = pres.options().symmetric_vertical_growth;
    let (mut x, mut y) = new_box.offset.unwrap_or_default();
    let (mut width, mut height) = new_box.extent;

    let mut updates = Vec::new();
    let mut current = child.clone();
    while let Some(group) = current.parent() {
        let transform = group_transform(pres, &group)?;
        let moved_x = on_child_x_changed(&transform, transform.child_to_parent_x(x), width);
        let next = on_child_y_changed(
            &moved_x,
            transform.child_to_parent_y(y),
            height,
            grow_bottom,
        );
        if next == transform {
            break;
        }

        debug!("{}: group box {:?} -> {:?}", group, transform, next);
        (x, y) = next.off;
        (width, height) = next.ext;
        updates.push((group.clone(), next));
        current = group;
    }
    Ok(updates)
}

/// Write planned group transforms.
pub(crate) fn apply_propagation(
    pres: &mut Presentation,
    updates: &[(ShapeKey, GroupTransform)],
) -> Result<()> {
    for (key, transform) in updates {
        let el = pres.element_mut(key)?;
        let sp_pr = el.ensure_child_at("p:grpSpPr", 1);
        let xfrm = sp_pr.ensure_child_at("a:xfrm", 0);
        transform.write_to(xfrm);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> GroupTransform {
        GroupTransform {
            off: (100, 100),
            ext: (200, 200),
            ch_off: (0, 0),
            ch_ext: (200, 200),
        }
    }

    #[test]
    fn test_child_moved_left_of_group() {
        let g = group();
        let local_x = -30;
        let next = on_child_x_changed(&g, g.child_to_parent_x(local_x), 50);
        assert_eq!(next.off.0, 70);
        assert_eq!(next.ext.0, 230);
        assert_eq!(next.ch_off.0, -30);
        assert_eq!(next.ch_ext.0, 230);
        // the child keeps its parent-space position
        assert_eq!(next.child_to_parent_x(local_x), 70);
    }

    #[test]
    fn test_child_moved_past_right_edge() {
        let g = group();
        let next = on_child_x_changed(&g, 280, 50);
        assert_eq!(next.off.0, 100);
        assert_eq!(next.ext.0, 230);
        assert_eq!(next.ch_ext.0, 230);
    }

    #[test]
    fn test_child_inside_is_noop() {
        let g = group();
        assert_eq!(on_child_x_changed(&g, 150, 50), g);
        assert_eq!(on_child_y_changed(&g, 150, 50, true), g);
    }

    #[test]
    fn test_vertical_bottom_growth_is_optional() {
        let g = group();
        assert_eq!(on_child_y_changed(&g, 280, 50, false), g);

        let grown = on_child_y_changed(&g, 280, 50, true);
        assert_eq!(grown.ext.1, 230);
        assert_eq!(grown.ch_ext.1, 230);
        assert_eq!(grown.off.1, 100);
    }

    #[test]
    fn test_vertical_top_shift() {
        let g = group();
        let next = on_child_y_changed(&g, 60, 50, false);
        assert_eq!(next.off.1, 60);
        assert_eq!(next.ext.1, 240);
        assert_eq!(next.ch_off.1, -40);
    }
}
