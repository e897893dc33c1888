//! Property sheets shown by the host's configuration UI.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    Text,
    List,
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub description: String,
    pub kind: PropertyKind,
    pub visible: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            visible: true,
        }
    }
}

/// Ordered list of properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    items: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: Property) -> &mut Property {
        self.items.push(property);
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.items.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.items.iter_mut().find(|p| p.name == name)
    }

    /// Returns `false` if no property called `name` exists.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.get_mut(name) {
            Some(p) => {
                p.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
