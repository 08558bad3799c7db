use serde::{Deserialize, Serialize};

/// Target component library a design can be mapped onto.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DesignSystem {
    #[default]
    ReactNativePaper,
    ReactNativeElements,
    NativeBase,
    MaterialUi,
    ChakraUi,
    Custom,
}

/// One component a design system offers, keyed by its generic kind
/// (`button`, `card`, `text`, `input`).
#[derive(Debug, Clone, Copy)]
pub struct SystemComponent {
    pub key: &'static str,
    pub name: &'static str,
    /// `(variant, prop)` pairs, e.g. `("outlined", "mode=\"outlined\"")`.
    pub variants: &'static [(&'static str, &'static str)],
}

const PAPER: &[SystemComponent] = &[
    SystemComponent {
        key: "button",
        name: "Button",
        variants: &[
            ("contained", "mode=\"contained\""),
            ("outlined", "mode=\"outlined\""),
            ("text", "mode=\"text\""),
        ],
    },
    SystemComponent {
        key: "card",
        name: "Card",
        variants: &[
            ("elevated", "mode=\"elevated\""),
            ("outlined", "mode=\"outlined\""),
        ],
    },
    SystemComponent {
        key: "text",
        name: "Text",
        variants: &[
            ("h1", "variant=\"headlineLarge\""),
            ("h2", "variant=\"headlineMedium\""),
            ("h3", "variant=\"headlineSmall\""),
            ("body", "variant=\"bodyLarge\""),
            ("caption", "variant=\"bodySmall\""),
        ],
    },
    SystemComponent {
        key: "input",
        name: "TextInput",
        variants: &[("outlined", "mode=\"outlined\""), ("flat", "mode=\"flat\"")],
    },
];

const MATERIAL: &[SystemComponent] = &[
    SystemComponent {
        key: "button",
        name: "Button",
        variants: &[
            ("contained", "variant=\"contained\""),
            ("outlined", "variant=\"outlined\""),
            ("text", "variant=\"text\""),
        ],
    },
    SystemComponent {
        key: "card",
        name: "Card",
        variants: &[("elevation", "variant=\"elevation\""), ("outlined", "variant=\"outlined\"")],
    },
    SystemComponent {
        key: "text",
        name: "Typography",
        variants: &[
            ("h1", "variant=\"h1\""),
            ("h2", "variant=\"h2\""),
            ("body", "variant=\"body1\""),
            ("caption", "variant=\"caption\""),
        ],
    },
    SystemComponent {
        key: "input",
        name: "TextField",
        variants: &[("outlined", "variant=\"outlined\""), ("filled", "variant=\"filled\"")],
    },
];

const CHAKRA: &[SystemComponent] = &[
    SystemComponent {
        key: "button",
        name: "Button",
        variants: &[
            ("solid", "variant=\"solid\""),
            ("outline", "variant=\"outline\""),
            ("ghost", "variant=\"ghost\""),
        ],
    },
    SystemComponent {
        key: "card",
        name: "Card",
        variants: &[("elevated", "variant=\"elevated\""), ("outline", "variant=\"outline\"")],
    },
    SystemComponent {
        key: "text",
        name: "Text",
        variants: &[("heading", "as=\"h2\""), ("body", "fontSize=\"md\"")],
    },
    SystemComponent {
        key: "input",
        name: "Input",
        variants: &[("outline", "variant=\"outline\""), ("filled", "variant=\"filled\"")],
    },
];

impl DesignSystem {
    pub const ALL: [DesignSystem; 6] = [
        DesignSystem::ReactNativePaper,
        DesignSystem::ReactNativeElements,
        DesignSystem::NativeBase,
        DesignSystem::MaterialUi,
        DesignSystem::ChakraUi,
        DesignSystem::Custom,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DesignSystem::ReactNativePaper => "React Native Paper",
            DesignSystem::ReactNativeElements => "React Native Elements",
            DesignSystem::NativeBase => "NativeBase",
            DesignSystem::MaterialUi => "Material UI",
            DesignSystem::ChakraUi => "Chakra UI",
            DesignSystem::Custom => "Custom",
        }
    }

    /// Components the mapping suggester can target. Empty for libraries
    /// without a curated catalog.
    pub fn catalog(&self) -> &'static [SystemComponent] {
        match self {
            DesignSystem::ReactNativePaper => PAPER,
            DesignSystem::MaterialUi => MATERIAL,
            DesignSystem::ChakraUi => CHAKRA,
            _ => &[],
        }
    }

    /// Packages an app built on this library needs regardless of screen content.
    pub fn base_packages(&self) -> &'static [&'static str] {
        match self {
            DesignSystem::ReactNativePaper => &[
                "react-native-paper",
                "react-native-safe-area-context",
                "react-native-vector-icons",
            ],
            DesignSystem::ReactNativeElements => {
                &["@rneui/themed", "@rneui/base", "react-native-vector-icons"]
            }
            DesignSystem::NativeBase => &[
                "native-base",
                "react-native-svg",
                "react-native-safe-area-context",
            ],
            DesignSystem::MaterialUi => &["@mui/material", "@emotion/react", "@emotion/styled"],
            DesignSystem::ChakraUi => &[
                "@chakra-ui/react",
                "@emotion/react",
                "@emotion/styled",
                "framer-motion",
            ],
            DesignSystem::Custom => &[],
        }
    }

    /// Catalog entry by its library name (`"TextInput"`).
    pub fn component_named(&self, name: &str) -> Option<&'static SystemComponent> {
        self.catalog().iter().find(|c| c.name == name)
    }
}
