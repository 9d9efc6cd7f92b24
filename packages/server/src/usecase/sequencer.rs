//! ルームごとの配信順序、およびユーザー一覧の配信順序を保証するロック

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomId;

/// ルームごとの直列化レーン
///
/// メッセージの追加とキューへの enqueue を同じレーンの中で行うことで、
/// ルーム内の配信順序が履歴への追加順序と一致します。
/// 参加処理（履歴の再生と現在のルームの更新）も同じレーンを通るため、
/// 参加の前後でメッセージが欠落したり重複したりしません。
///
/// ルームとは別に、ユーザー一覧（`update_user_list`）のためのレーンを 1 つ持ちます。
/// 一覧のスナップショットと enqueue をこのレーンの中で行うため、
/// 各接続が最後に受け取る一覧は常に最新の状態になります。
#[derive(Default)]
pub struct RoomSequencer {
    lanes: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
    presence: Arc<Mutex<()>>,
}

impl RoomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームのレーンを取得。ガードを drop するまで同じルームの他の処理は待たされる
    pub async fn acquire(&self, room_id: &RoomId) -> OwnedMutexGuard<()> {
        let lane = {
            let mut lanes = self.lanes.lock().await;
            lanes.entry(room_id.clone()).or_default().clone()
        };
        lane.lock_owned().await
    }

    /// ユーザー一覧のレーンを取得
    pub async fn acquire_presence(&self) -> OwnedMutexGuard<()> {
        self.presence.clone().lock_owned().await
    }

    /// 削除されたルームのレーンを破棄
    pub async fn forget(&self, room_id: &RoomId) {
        self.lanes.lock().await.remove(room_id);
    }
}
