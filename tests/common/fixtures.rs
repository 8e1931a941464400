//! Record builders with realistic defaults.

use dropdesk::model::{Note, Project, SubTask, Tag, Task, Wallet};

pub const EVM_A: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
pub const EVM_B: &str = "0x8617E340B3D01FA5F11F306F4090FD50E238070D";
pub const STARKNET_A: &str = "0x04a3b2c1d0e9f8a7b6c5d4e3f2a1b0c9d8e7f6a5b4c3d2e1f0a9b8c7d6e5f4a3";

pub fn wallet(address: &str) -> Wallet {
    Wallet {
        address: address.to_string(),
        wallet_type: "EVM".to_string(),
        ..Wallet::default()
    }
}

pub fn project(name: &str) -> Project {
    let mut project = Project::new(name);
    project.website = format!("https://{}.xyz", name.to_lowercase());
    project.tags = vec!["L2".to_string()];
    project
}

pub fn task(name: &str, project_id: &str) -> Task {
    let mut task = Task::new(name, project_id);
    task.priority = 3;
    task
}

pub fn sub_task(name: &str) -> SubTask {
    SubTask {
        name: name.to_string(),
        ..SubTask::default()
    }
}

pub fn note(title: &str) -> Note {
    Note::new(title, format!("{title} details"))
}

pub fn tag(name: &str) -> Tag {
    Tag {
        name: name.to_string(),
        color: dropdesk::util::color_for_name(name).to_string(),
        ..Tag::default()
    }
}
