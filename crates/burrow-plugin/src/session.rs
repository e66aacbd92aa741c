//! Per-session state: the maze plus the session's live plugin instances.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use burrow_core::AppResult;
use burrow_maze::{IdentifierSequence, Maze, MazeSpec, RoomPos, carve};

use crate::descriptor::PluginDescriptor;
use crate::hooks::MazePlugin;
use crate::resolver::ActiveRegistry;

/// The plugin instances of one session, in registry order.
///
/// Snapshotted when the session's maze is created and exclusively owned by
/// that session; two sessions never share an instance.
pub struct SessionPluginSet {
    entries: Vec<(Arc<PluginDescriptor>, Arc<dyn MazePlugin>)>,
}

impl SessionPluginSet {
    fn instantiate(registry: &ActiveRegistry) -> AppResult<Self> {
        let mut entries = Vec::with_capacity(registry.len());
        for descriptor in registry.iter() {
            let instance = descriptor.instantiate()?;
            entries.push((Arc::clone(descriptor), instance));
        }
        Ok(Self { entries })
    }

    /// Instances in registry order, the order every hook runs in.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MazePlugin>> {
        self.entries.iter().map(|(_, instance)| instance)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn MazePlugin>> {
        self.entries
            .iter()
            .find(|(descriptor, _)| descriptor.name == name)
            .map(|(_, instance)| instance)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(d, _)| d.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(d, _)| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One client's game: a maze and the plugin instances serving it.
///
/// Lives behind a `tokio::sync::RwLock` in the session store. Hooks run
/// sequentially on the request task; errors propagate uncaught.
pub struct GameSession {
    maze: Maze,
    plugins: SessionPluginSet,
}

impl GameSession {
    /// Builds a session: instantiate every registry plugin, run
    /// `pre_initialize` on the blank maze, carve and assign identifiers,
    /// set the current room to the start, then run `post_initialize`.
    pub async fn create(registry: &ActiveRegistry, spec: MazeSpec) -> AppResult<Self> {
        spec.validate()?;
        let plugins = SessionPluginSet::instantiate(registry)?;

        let mut maze = Maze::new(spec.width, spec.height)?;
        for plugin in plugins.iter() {
            plugin.pre_initialize(&mut maze).await?;
        }

        let mut sequence = IdentifierSequence::new(spec.seed)?;
        carve(&mut maze, &mut sequence);
        maze.assign_identifiers(&mut sequence);
        let start = maze.start_room();
        maze.set_current_room(start)?;

        for plugin in plugins.iter() {
            plugin.post_initialize(&mut maze).await?;
        }

        debug!(
            width = maze.width(),
            height = maze.height(),
            plugins = plugins.len(),
            "created session maze"
        );
        Ok(Self { maze, plugins })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn maze_mut(&mut self) -> &mut Maze {
        &mut self.maze
    }

    pub fn plugins(&self) -> &SessionPluginSet {
        &self.plugins
    }

    /// The session's instance of `name`, if the plugin was active when the
    /// session was created.
    pub fn plugin(&self, name: &str) -> Option<&Arc<dyn MazePlugin>> {
        self.plugins.get(name)
    }

    pub async fn run_get_maze(&self, result: &mut Map<String, Value>) -> AppResult<()> {
        for plugin in self.plugins.iter() {
            plugin.get_maze(&self.maze, result).await?;
        }
        Ok(())
    }

    pub async fn run_update_maze(
        &self,
        value: &Value,
        result: &mut Map<String, Value>,
    ) -> AppResult<()> {
        for plugin in self.plugins.iter() {
            plugin.update_maze(&self.maze, value, result).await?;
        }
        Ok(())
    }

    pub async fn run_get_room(
        &self,
        pos: RoomPos,
        neighbor_details: bool,
        result: &mut Map<String, Value>,
    ) -> AppResult<()> {
        for plugin in self.plugins.iter() {
            plugin.get_room(&self.maze, pos, neighbor_details, result).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl MazePlugin for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn pre_initialize(&self, _maze: &mut Maze) -> AppResult<()> {
            self.log.lock().unwrap().push(format!("{}:pre", self.name));
            Ok(())
        }

        async fn post_initialize(&self, _maze: &mut Maze) -> AppResult<()> {
            self.log.lock().unwrap().push(format!("{}:post", self.name));
            Ok(())
        }

        async fn get_maze(&self, _maze: &Maze, result: &mut Map<String, Value>) -> AppResult<()> {
            result.insert("shared".into(), Value::String(self.name.into()));
            Ok(())
        }
    }

    fn recorder_descriptor(
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    ) -> Arc<PluginDescriptor> {
        Arc::new(
            PluginDescriptor::builder(name, "1.0")
                .factory(Arc::new(move |_| {
                    Ok(Arc::new(Recorder { name, log: Arc::clone(&log) }) as Arc<dyn MazePlugin>)
                }))
                .build()
                .unwrap(),
        )
    }

    fn spec() -> MazeSpec {
        MazeSpec { width: 5, height: 4, walls: 4, seed: 77 }
    }

    #[tokio::test]
    async fn create_with_empty_registry() {
        let session = GameSession::create(&ActiveRegistry::default(), spec()).await.unwrap();
        assert!(session.plugins().is_empty());
        assert_eq!(session.maze().current_room(), session.maze().start_room());
    }

    #[tokio::test]
    async fn lifecycle_hooks_run_in_registry_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = resolve(&[
            recorder_descriptor("first", Arc::clone(&log)),
            recorder_descriptor("second", Arc::clone(&log)),
        ]);
        GameSession::create(&registry, spec()).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:pre", "second:pre", "first:post", "second:post"]
        );
    }

    #[tokio::test]
    async fn later_plugin_wins_shared_result_key() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = resolve(&[
            recorder_descriptor("first", Arc::clone(&log)),
            recorder_descriptor("second", Arc::clone(&log)),
        ]);
        let session = GameSession::create(&registry, spec()).await.unwrap();
        let mut result = Map::new();
        session.run_get_maze(&mut result).await.unwrap();
        assert_eq!(result["shared"], Value::String("second".into()));
    }

    #[tokio::test]
    async fn instances_are_not_shared_between_sessions() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = resolve(&[recorder_descriptor("solo", Arc::clone(&log))]);
        let a = GameSession::create(&registry, spec()).await.unwrap();
        let b = GameSession::create(&registry, spec()).await.unwrap();
        let pa = a.plugin("solo").unwrap();
        let pb = b.plugin("solo").unwrap();
        assert!(!Arc::ptr_eq(pa, pb));
    }

    #[tokio::test]
    async fn invalid_spec_is_rejected() {
        let bad = MazeSpec { width: 0, height: 4, walls: 4, seed: 1 };
        assert!(GameSession::create(&ActiveRegistry::default(), bad).await.is_err());
    }
}
