use crate::consts::gray::*;
use crate::consts::BACKGROUND_LABEL;
use crate::eight::Connectivity;
use crate::{BinaryMask, LabelMap};
use ndarray::Array2;
use std::collections::VecDeque;

/// 连通域标记算法实现块.
impl BinaryMask {
    /// 按照连通规则 `conn` 标记前景中的所有连通区域.
    ///
    /// 两个前景像素 `p1` 和 `p2` 属于同一个区域, 当且仅当存在一条从 `p1` 到 `p2`
    /// 的 `conn`-相邻路径, 且路径上的所有像素都是前景.
    ///
    /// 标签从 1 开始, 按 **行优先** 扫描序中每个区域第一个像素出现的先后分配;
    /// 背景保持为 0. 内部实现保证每次运行产生同样的结果.
    pub fn label(&self, conn: Connectivity) -> LabelMap {
        let mut labels = Array2::<u32>::zeros(self.shape());
        let mut bfs_q = VecDeque::with_capacity(16);
        let mut next = BACKGROUND_LABEL;

        for seed in self.pos_iter() {
            if !is_foreground(self[seed]) || labels[seed] != BACKGROUND_LABEL {
                continue;
            }
            next += 1;
            labels[seed] = next;
            bfs_q.push_back(seed);

            // bfs
            while let Some(cur) = bfs_q.pop_front() {
                for neigh in self.neighbour_positions(cur, conn) {
                    if is_foreground(self[neigh]) && labels[neigh] == BACKGROUND_LABEL {
                        labels[neigh] = next;
                        bfs_q.push_back(neigh);
                    }
                }
            }
        }
        LabelMap::new(labels, next as usize)
    }
}
