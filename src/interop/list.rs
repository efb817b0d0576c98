//! Foreign linked lists
//!
//! Doubly and singly linked lists share one backbone representation here;
//! the kind records which tag produced the list so conversions can verify
//! it. Converting a list always consumes its backbone.

use super::argument::Argument;
use super::bridge::Runtime;
use super::marshal::argument_to_value;
use super::types::TypeInfo;
use super::value::HostValue;
use crate::errors::Result;
use crate::logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `GList`
    Doubly,
    /// `GSList`
    Singly,
}

impl ListKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doubly => "glist",
            Self::Singly => "gslist",
        }
    }
}

#[derive(Debug, PartialEq)]
struct ListNode {
    data: Argument,
    next: Option<Box<ListNode>>,
}

/// Owned foreign list backbone
#[derive(Debug, PartialEq)]
pub struct ForeignList {
    kind: ListKind,
    head: Option<Box<ListNode>>,
    len: usize,
}

impl ForeignList {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            head: None,
            len: 0,
        }
    }

    /// Build a list whose nodes hold `items` in iteration order
    pub fn from_items(kind: ListKind, items: impl IntoIterator<Item = Argument>) -> Self {
        let items: Vec<Argument> = items.into_iter().collect();
        let mut list = Self::new(kind);
        for data in items.into_iter().rev() {
            list.prepend(data);
        }
        list
    }

    #[inline]
    pub fn kind(&self) -> ListKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn prepend(&mut self, data: Argument) {
        let next = self.head.take();
        self.head = Some(Box::new(ListNode { data, next }));
        self.len += 1;
    }

    /// Unlink and free the first node, returning its payload
    pub fn pop_front(&mut self) -> Option<Argument> {
        self.head.take().map(|node| {
            let node = *node;
            self.head = node.next;
            self.len -= 1;
            node.data
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        std::iter::successors(self.head.as_deref(), |node| node.next.as_deref())
            .map(|node| &node.data)
    }

    /// Free every node; returns how many were freed
    pub fn clear(&mut self) -> usize {
        let mut freed = 0;
        while self.pop_front().is_some() {
            freed += 1;
        }
        freed
    }
}

impl Drop for ForeignList {
    fn drop(&mut self) {
        // Iterative, so long lists cannot overflow the stack
        self.clear();
    }
}

/// Convert every node payload in list order, then free the backbone
///
/// The backbone is freed even when a payload fails to convert.
pub fn list_to_value(runtime: &dyn Runtime, list: ForeignList, element: &TypeInfo) -> Result<HostValue> {
    let (values, _) = convert_nodes(runtime, list, element);
    values.map(HostValue::List)
}

/// Returns the conversion result and the number of backbone nodes freed
pub(crate) fn convert_nodes(
    runtime: &dyn Runtime,
    mut list: ForeignList,
    element: &TypeInfo,
) -> (Result<Vec<HostValue>>, usize) {
    let kind = list.kind();
    let mut values = Vec::with_capacity(list.len());
    let mut freed = 0;

    let mut failure = None;
    while let Some(data) = list.pop_front() {
        freed += 1;
        match argument_to_value(runtime, data, element) {
            Ok(value) => values.push(value),
            Err(error) => {
                failure = Some(error);
                break;
            }
        }
    }
    freed += list.clear();

    logging::log_list_released(kind.as_str(), freed);
    match failure {
        Some(error) => (Err(error), freed),
        None => (Ok(values), freed),
    }
}
