use std::fmt;

/// Which side of the run a component is acting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Renderer,
    Worker { index: usize },
}

/// Identity of the current task, handed to every component that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    pub role: Role,
    pub worker_count: usize,
}

impl RunContext {
    pub fn renderer(worker_count: usize) -> Self {
        Self {
            role: Role::Renderer,
            worker_count,
        }
    }

    pub fn worker(index: usize, worker_count: usize) -> Self {
        Self {
            role: Role::Worker { index },
            worker_count,
        }
    }

    pub fn is_renderer(&self) -> bool {
        self.role == Role::Renderer
    }
}

/// Short log tag: `r0` for the renderer, `w<i>` for worker `i`.
impl fmt::Display for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Role::Renderer => f.write_str("r0"),
            Role::Worker { index } => write!(f, "w{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_tags() {
        assert_eq!(RunContext::renderer(4).to_string(), "r0");
        assert_eq!(RunContext::worker(3, 4).to_string(), "w3");
        assert!(RunContext::renderer(1).is_renderer());
        assert!(!RunContext::worker(0, 1).is_renderer());
    }
}
