//! Built-in framework emitters

use std::str::FromStr;

use routeforge_config::TargetKind;

use crate::emitter::{Framework, PathStyle, TargetEmitter};
use crate::error::{EmitError, Result};
use crate::templates::TemplateSet;

macro_rules! target_emitter {
    ($ty:ident, $kind:expr, $framework:expr, $style:expr) => {
        pub struct $ty {
            templates: TemplateSet,
        }

        impl $ty {
            pub fn new() -> Result<Self> {
                Ok(Self {
                    templates: TemplateSet::for_target($kind)?,
                })
            }
        }

        impl TargetEmitter for $ty {
            fn kind(&self) -> TargetKind {
                $kind
            }

            fn framework(&self) -> Framework {
                $framework
            }

            fn path_style(&self) -> PathStyle {
                $style
            }

            fn templates(&self) -> &TemplateSet {
                &self.templates
            }
        }
    };
}

target_emitter!(
    GinEmitter,
    TargetKind::Gin,
    Framework {
        name: "Gin",
        module: "github.com/gin-gonic/gin",
        version: "v1.10.0",
    },
    PathStyle::Colon
);

target_emitter!(
    EchoEmitter,
    TargetKind::Echo,
    Framework {
        name: "Echo",
        module: "github.com/labstack/echo/v4",
        version: "v4.11.4",
    },
    PathStyle::Colon
);

target_emitter!(
    ChiEmitter,
    TargetKind::Chi,
    Framework {
        name: "Chi",
        module: "github.com/go-chi/chi/v5",
        version: "v5.0.12",
    },
    PathStyle::Brace
);

target_emitter!(
    FiberEmitter,
    TargetKind::Fiber,
    Framework {
        name: "Fiber",
        module: "github.com/gofiber/fiber/v2",
        version: "v2.52.4",
    },
    PathStyle::Colon
);

/// Build the emitter for one target
pub fn emitter_for(kind: TargetKind) -> Result<Box<dyn TargetEmitter>> {
    Ok(match kind {
        TargetKind::Gin => Box::new(GinEmitter::new()?),
        TargetKind::Echo => Box::new(EchoEmitter::new()?),
        TargetKind::Chi => Box::new(ChiEmitter::new()?),
        TargetKind::Fiber => Box::new(FiberEmitter::new()?),
    })
}

/// Build an emitter from a framework name such as `"gin"`
pub fn emitter_named(name: &str) -> Result<Box<dyn TargetEmitter>> {
    let kind =
        TargetKind::from_str(name).map_err(|_| EmitError::UnsupportedTarget(name.to_string()))?;
    emitter_for(kind)
}

/// Emitters for every supported target, in [`TargetKind::ALL`] order
pub fn all_emitters() -> Result<Vec<Box<dyn TargetEmitter>>> {
    TargetKind::ALL.into_iter().map(emitter_for).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_for_matches_kind() {
        for kind in TargetKind::ALL {
            assert_eq!(emitter_for(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_only_chi_keeps_braces() {
        let styles: Vec<_> = all_emitters()
            .unwrap()
            .iter()
            .map(|e| (e.kind(), e.path_style()))
            .collect();
        for (kind, style) in styles {
            let expected = if kind == TargetKind::Chi {
                PathStyle::Brace
            } else {
                PathStyle::Colon
            };
            assert_eq!(style, expected, "{}", kind);
        }
    }

    #[test]
    fn test_unknown_framework_name() {
        assert!(matches!(
            emitter_named("rocket"),
            Err(EmitError::UnsupportedTarget(name)) if name == "rocket"
        ));
        assert_eq!(emitter_named("fiber").unwrap().kind(), TargetKind::Fiber);
    }
}
