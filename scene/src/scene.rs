//! The scene container, interaction mode and selection scoping.

use std::ops::{Deref, DerefMut};

use crate::action::Action;
use crate::armature::EditSession;
use crate::error::SceneError;
use crate::ids::{unique_name, ActionId, ObjectId, SceneId};
use crate::object::{Modifier, Object, ObjectData};

/// Interaction mode of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Object,
    /// An armature is open for bone editing
    Edit(ObjectId),
}

/// Objects and actions linked into one scene.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    id: SceneId,
    objects: Vec<Object>,
    actions: Vec<Action>,
    mode: Mode,
    active: Option<ObjectId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            name: String::new(),
            id: SceneId::next(),
            objects: Vec::new(),
            actions: Vec::new(),
            mode: Mode::default(),
            active: None,
        }
    }
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Identity of this scene; ids of objects and actions are only meaningful
    /// together with it.
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Creates an object and links it into the scene.
    pub fn add_object(&mut self, name: &str, data: ObjectData) -> ObjectId {
        let name = unique_name(name, |n| self.objects.iter().any(|o| o.name == n));
        let id = ObjectId(self.objects.len() as u32);
        tracing::debug!("Linking {} object '{}' as {:?}", data.kind(), name, id);
        self.objects.push(Object::new(name, data));
        id
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Result<&Object, SceneError> {
        self.objects
            .get(id.index())
            .ok_or(SceneError::ObjectNotFound(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object, SceneError> {
        self.objects
            .get_mut(id.index())
            .ok_or(SceneError::ObjectNotFound(id))
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.name == name)
            .map(|i| ObjectId(i as u32))
    }

    /// Sets or clears an object's parent, refusing cycles.
    pub fn set_parent(
        &mut self,
        child: ObjectId,
        parent: Option<ObjectId>,
    ) -> Result<(), SceneError> {
        if let Some(parent) = parent {
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == child {
                    return Err(SceneError::ParentCycle { child, parent });
                }
                cursor = self.object(current)?.parent;
            }
        }
        self.object_mut(child)?.parent = parent;
        Ok(())
    }

    /// Appends a modifier to an object's stack.
    pub fn add_modifier(&mut self, id: ObjectId, modifier: Modifier) -> Result<(), SceneError> {
        if let Modifier::Armature { object, .. } = &modifier {
            let target = self.object(*object)?;
            if target.armature().is_none() {
                return Err(SceneError::NotAnArmature(target.name.clone()));
            }
        }
        self.object_mut(id)?.modifiers.push(modifier);
        Ok(())
    }

    /// Adds an action. Keyframes of every curve are sorted by frame.
    pub fn add_action(&mut self, mut action: Action) -> ActionId {
        for curve in &mut action.fcurves {
            curve.sort_keyframes();
        }
        let id = ActionId(self.actions.len() as u32);
        self.actions.push(action);
        id
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, id: ActionId) -> Result<&Action, SceneError> {
        self.actions
            .get(id.index())
            .ok_or(SceneError::ActionNotFound(id))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Currently selected objects, in scene order.
    pub fn selected(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.selected)
            .map(|(i, _)| ObjectId(i as u32))
            .collect()
    }

    /// Makes `id` the only selected object and the active one.
    pub fn select_only(&mut self, id: ObjectId) -> Result<(), SceneError> {
        self.object(id)?;
        for object in &mut self.objects {
            object.selected = false;
        }
        self.objects[id.index()].selected = true;
        self.active = Some(id);
        Ok(())
    }

    /// Enters edit mode on an armature object.
    pub fn edit_armature(&mut self, id: ObjectId) -> Result<EditSession<'_>, SceneError> {
        if let Mode::Edit(open) = self.mode {
            return Err(SceneError::EditSessionActive(open));
        }

        let object = self
            .objects
            .get_mut(id.index())
            .ok_or(SceneError::ObjectNotFound(id))?;
        let ObjectData::Armature(armature) = &mut object.data else {
            return Err(SceneError::NotAnArmature(object.name.clone()));
        };

        self.mode = Mode::Edit(id);
        Ok(EditSession {
            object: id,
            armature,
            mode: &mut self.mode,
        })
    }

    /// Selects only `id` until the returned scope is dropped.
    ///
    /// The previous selection and active object are restored on drop.
    pub fn isolate_selection(&mut self, id: ObjectId) -> Result<SelectionScope<'_>, SceneError> {
        let saved_selection = self.objects.iter().map(|o| o.selected).collect();
        let saved_active = self.active;
        self.select_only(id)?;
        Ok(SelectionScope {
            scene: self,
            saved_selection,
            saved_active,
        })
    }
}

/// Temporary selection override. Derefs to the scene.
pub struct SelectionScope<'a> {
    scene: &'a mut Scene,
    saved_selection: Vec<bool>,
    saved_active: Option<ObjectId>,
}

impl Deref for SelectionScope<'_> {
    type Target = Scene;

    fn deref(&self) -> &Scene {
        self.scene
    }
}

impl DerefMut for SelectionScope<'_> {
    fn deref_mut(&mut self) -> &mut Scene {
        self.scene
    }
}

impl Drop for SelectionScope<'_> {
    fn drop(&mut self) {
        for (index, object) in self.scene.objects.iter_mut().enumerate() {
            object.selected = self.saved_selection.get(index).copied().unwrap_or(false);
        }
        self.scene.active = self.saved_active;
    }
}
