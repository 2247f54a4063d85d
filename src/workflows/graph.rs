use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use thiserror::Error;

/// Failures raised while building a `DependencyGraph`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("graph capacity must be positive, got {0}")]
    InvalidCapacity(usize),
    #[error("graph is full (capacity {0})")]
    CapacityExceeded(usize),
    #[error("vertex {0} is already in the graph")]
    DuplicateVertex(String),
}

/// DFS marking:
/// * `White`: not visited yet,
/// * `Gray`: on the current traversal stack,
/// * `Black`: fully explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

#[derive(Debug, Clone)]
struct Vertex<Id> {
    id: Id,
    /// outgoing edges, in the order they were declared
    successors: Vec<Id>,
}

/// A directed graph with a fixed number of vertex slots.
///
/// Vertices live in an arena indexed by insertion order, `id_to_idx` maps
/// an identifier back to its slot.
/// Edges are stored as identifiers and are not checked when a vertex is added:
/// an edge pointing to an identifier that never became a vertex is ignored
/// by the traversal.
#[derive(Debug, Clone)]
pub struct DependencyGraph<Id> {
    capacity: usize,
    vertices: Vec<Vertex<Id>>,
    id_to_idx: HashMap<Id, usize>,
}

impl<Id> DependencyGraph<Id>
where
    Id: Eq + Hash + Clone + Display,
{
    /// Allocate a graph able to hold `capacity` vertices.
    pub fn with_capacity(capacity: usize) -> Result<Self, GraphError> {
        if capacity == 0 {
            return Err(GraphError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            vertices: Vec::with_capacity(capacity),
            id_to_idx: HashMap::with_capacity(capacity),
        })
    }

    /// Register `id` with its outgoing edges.
    pub fn add_vertex(&mut self, id: Id, successors: Vec<Id>) -> Result<(), GraphError> {
        if self.id_to_idx.contains_key(&id) {
            return Err(GraphError::DuplicateVertex(id.to_string()));
        }
        if self.vertices.len() == self.capacity {
            return Err(GraphError::CapacityExceeded(self.capacity));
        }
        self.id_to_idx.insert(id.clone(), self.vertices.len());
        self.vertices.push(Vertex { id, successors });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Vertex identifiers, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.vertices.iter().map(|vertex| &vertex.id)
    }

    /// Declared outgoing edges of `id`, or None if `id` is not a vertex.
    pub fn successors(&self, id: &Id) -> Option<&[Id]> {
        self.id_to_idx
            .get(id)
            .map(|idx| self.vertices[*idx].successors.as_slice())
    }

    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Return one cycle as a list of vertex ids, the first id being repeated
    /// at the end (eg: `[A, B, C, A]`).
    /// Returns an empty Vec if the graph is acyclic.
    pub fn cycle_path(&self) -> Vec<Id> {
        self.find_cycle().unwrap_or_default()
    }

    /// Three-color depth first search, run from every white vertex in
    /// insertion order (so the result only depends on how the graph was built).
    ///
    /// The traversal uses an explicit stack of `(vertex, next edge to follow)`
    /// instead of recursion.
    fn find_cycle(&self) -> Option<Vec<Id>> {
        // resolve edges to arena indices once, dropping unknown targets
        let edges: Vec<Vec<usize>> = self
            .vertices
            .iter()
            .map(|vertex| {
                vertex
                    .successors
                    .iter()
                    .filter_map(|succ| self.id_to_idx.get(succ).copied())
                    .collect()
            })
            .collect();

        let mut colors = vec![Color::White; self.vertices.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.vertices.len() {
            if colors[root] != Color::White {
                continue;
            }
            colors[root] = Color::Gray;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let vertex = top.0;
                let next = match edges[vertex].get(top.1) {
                    Some(next) => *next,
                    None => {
                        colors[vertex] = Color::Black;
                        stack.pop();
                        continue;
                    }
                };
                top.1 += 1;

                match colors[next] {
                    Color::White => {
                        colors[next] = Color::Gray;
                        stack.push((next, 0));
                    }
                    Color::Gray => {
                        // gray vertices are always on the stack
                        let start = stack
                            .iter()
                            .position(|(idx, _)| *idx == next)
                            .unwrap_or_default();
                        let mut path: Vec<Id> = stack[start..]
                            .iter()
                            .map(|(idx, _)| self.vertices[*idx].id.clone())
                            .collect();
                        path.push(self.vertices[next].id.clone());
                        return Some(path);
                    }
                    Color::Black => {}
                }
            }
        }
        None
    }
}

/// Format a path of vertices as `A -> B -> C`.
pub fn render_path<Id: Display>(path: &[Id]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<String>>()
        .join(" -> ")
}
