/// Screens draw their own headers
pub const HEADER_SHOWN: bool = false;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Onboard,
    Main,
    /// Shown after a walk, with that walk's final step count
    PastSteps { steps: u64 },
}

/// A stack of routes. The root route can not be popped.
#[derive(Debug)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Navigator {
    pub fn new(root: Route) -> Self {
        Self {
            stack: vec![root],
        }
    }

    pub fn current(&self) -> &Route {
        // The stack always holds the root
        &self.stack[self.stack.len() - 1]
    }

    pub fn navigate(&mut self, route: Route) {
        tracing::debug!("Navigating {:?} -> {:?}", self.current(), route);
        self.stack.push(route);
    }

    pub fn go_back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }

        self.stack.pop();
        true
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Onboard)
    }
}

#[test]
fn root_is_never_popped() {
    let mut navigator = Navigator::default();
    assert_eq!(navigator.current(), &Route::Onboard);
    assert!(!HEADER_SHOWN);
    assert!(!navigator.go_back());

    navigator.navigate(Route::Main);
    navigator.navigate(Route::PastSteps { steps: 1300 });
    assert_eq!(navigator.current(), &Route::PastSteps { steps: 1300 });
    assert_eq!(navigator.depth(), 3);

    assert!(navigator.go_back());
    assert_eq!(navigator.current(), &Route::Main);
    assert!(navigator.go_back());
    assert!(!navigator.go_back());
    assert_eq!(navigator.current(), &Route::Onboard);
}
